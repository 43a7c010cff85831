pub mod criteria;
pub mod dump;
pub mod element_model;
pub mod source;
