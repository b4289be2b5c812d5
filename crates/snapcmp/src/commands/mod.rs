mod approve;
mod compare;
mod init;
mod review;

pub use self::approve::approve;
pub use self::compare::compare;
pub use self::init::init;
pub use self::review::review;
pub use self::test::test;
