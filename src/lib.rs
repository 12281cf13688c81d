pub mod card;
pub mod charge;
pub mod config;
pub mod csv;
pub mod model;
pub mod money;
pub mod random;
pub mod store;

pub use charge::{ChargeError, ChargeProcessor, LockTimeout, TransactionId};
pub use config::{AppConfig, FaultConfig};
pub use model::{ChargeRequest, CreditCard, PaymentRecord};
pub use money::Money;
