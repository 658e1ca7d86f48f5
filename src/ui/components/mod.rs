pub mod menu;
pub mod problem_card;
pub mod progress_bar;
pub mod score_card;
pub mod stats_dashboard;
pub mod stats_sidebar;
