// Core modules for the shardnet connection engine
pub mod config; // EngineConfig + SocketRole
pub mod error; // EngineError taxonomy
pub mod conn; // ConnectionInfo, PendingWrite, InterestState, CloseListener
pub mod net; // socket build + tuning
pub mod shard; // EpollShard (worker loop, write queues, interest toggling)
pub mod pool; // ShardPool (identity routing, routing index)
pub mod registry; // ConnectionRegistry (admission, identity map)
pub mod sender; // standalone tuned outbound sender

// Re-export all public items from modules for easier access
pub use config::*;
pub use error::*;
pub use conn::*;
pub use net::*;
pub use shard::*;
pub use pool::*;
pub use registry::*;
pub use sender::*;
