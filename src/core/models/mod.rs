pub mod account;
pub mod expense;
pub mod group;
pub mod ids;
pub mod money;
pub mod settlement;

pub use account::Account;
pub use expense::{Expense, Split};
pub use group::Group;
pub use ids::{AccountId, ExpenseId, GroupId, SplitId};
pub use settlement::{NetBalance, Settlement};
