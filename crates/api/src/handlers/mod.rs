pub mod auth;
pub mod campaigns;
pub mod drafts;
pub mod paid_content;
pub mod review;
