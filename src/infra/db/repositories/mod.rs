pub mod expenses;
pub mod payments;
pub mod unit_members;
