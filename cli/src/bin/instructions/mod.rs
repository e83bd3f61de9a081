pub mod process_balances;
pub mod process_claim;
pub mod process_claimable;
pub mod process_create;
pub mod process_create_dummy_csv;
pub mod process_eligibility;
pub mod process_list;
pub mod process_show;

pub use process_balances::process_balances;
pub use process_claim::process_claim;
pub use process_claimable::process_claimable;
pub use process_create::process_create;
pub use process_create_dummy_csv::process_create_dummy_csv;
pub use process_eligibility::process_eligibility;
pub use process_list::process_list;
pub use process_show::process_show;
