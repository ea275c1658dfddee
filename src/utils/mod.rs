pub mod conf_helper;
pub mod corpus_helper;
