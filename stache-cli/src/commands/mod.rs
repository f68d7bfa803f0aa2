pub mod bundle;
pub mod init;
pub mod list;
pub mod render;
pub mod serve;
