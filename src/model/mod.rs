pub mod bert;
pub mod config;

pub use bert::BertForSequenceClassification;
pub use config::Config;
