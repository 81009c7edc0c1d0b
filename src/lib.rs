//! 嵌入式JSON（转义字符串）编辑核心库
//!
//! 提供转义字符串的编解码、文档加载/编辑/校验/保存状态机、
//! 影子树导航与节点回写功能
//! 遵循MVVM架构模式，核心逻辑不依赖任何UI框架

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::session::{
    AppError, Document, DownloadSink, EditorSession, SaveOutcome, WriteTarget,
};
pub use model::shadow_tree::{build_shadow_tree, NodeKind, TreeNode};
pub use model::transcode::{decode, encode, pretty_print, validate};
pub use vm::view_state::ViewState;
