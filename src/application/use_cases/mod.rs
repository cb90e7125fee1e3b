pub mod extraction;
pub mod test_case_generation;
