pub mod cli;
pub mod run;
pub mod run_analysis;
pub mod run_chat;
pub mod run_critique;
pub mod show_email_stats;
pub mod show_top_emails;
