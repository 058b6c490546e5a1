//! Per-room broadcast hubs.
//!
//! ## 構成
//!
//! - `coordinator`: Room ごとの調停ループ（メンバー管理とファンアウト）
//! - `member`: ハブに登録されるコネクションの送信キュー
//! - `registry`: Room ID からハブを引く、プロセス寿命のレジストリ
//!
//! メンバー集合は各ハブの調停ループだけが所有し、外部からは
//! register / unregister / broadcast のイベント送信でのみ変更される。

mod coordinator;
mod error;
mod member;
mod registry;

pub use coordinator::{Hub, WeakHub};
pub use error::HubError;
pub use member::{Member, MemberInfo};
pub use registry::HubRegistry;
