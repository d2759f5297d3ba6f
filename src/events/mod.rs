//! 계정 변경 이벤트
//!
//! 변경이 커밋된 뒤 백그라운드 작업에서 발행됩니다. 전달 보장, 순서 보장, 재시도는 없습니다.

pub mod emitter;
pub mod message;
pub mod publisher;

pub use emitter::EventEmitter;
pub use message::{AccountEvent, ChangeKind};
pub use publisher::RedisEventPublisher;
