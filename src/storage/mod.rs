mod file;
mod trait_def;

pub use file::FileAccountStore;
pub use trait_def::AccountStore;
