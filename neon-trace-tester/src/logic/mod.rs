pub mod fuzz;
pub mod reports;
pub mod session;
pub mod tester;

pub use session::TestSession;
pub use tester::*;
