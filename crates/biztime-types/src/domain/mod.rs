pub mod company;
pub mod invoice;
pub mod timestamp;
