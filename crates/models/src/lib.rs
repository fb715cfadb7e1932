pub mod doctor;
pub mod errors;
pub mod patient;
pub mod user;

#[cfg(test)]
mod tests;
