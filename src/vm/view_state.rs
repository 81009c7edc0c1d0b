//! 视图投影层：把会话状态折算成渲染层直接可用的快照
//!
//! 具体渲染框架由宿主决定，这里不持有任何UI类型，
//! 快照可序列化，便于跨进程/跨语言递给任意前端

use std::time::SystemTime;

use serde::Serialize;

use crate::model::session::EditorSession;

// === 状态栏文案常量 ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "文档加载完成";
pub const STATUS_SAVED: &str = "保存成功";
pub const STATUS_COPIED: &str = "已复制到剪贴板";
pub const STATUS_EXPORTED: &str = "已导出";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";
/// 字符串页签在文档无效时显示的占位文案
pub const INVALID_PREVIEW_NOTICE: &str = "JSON无效 - 请先在编辑器中修正";

/// 渲染快照：状态栏、工具栏与编辑器脚注所需的全部展示数据
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub status: String,
    pub source_name: String,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub error_text: String,
    /// 编辑器脚注：行数
    pub line_count: usize,
    /// 编辑器脚注：字符数
    pub char_count: usize,
    /// 最近保存时间的相对描述
    pub last_saved_text: String,
}

impl ViewState {
    /// 从会话折算一份快照；会话本身不被改动
    pub fn snapshot(session: &EditorSession) -> Self {
        let doc = &session.doc;
        let status = match (&doc.last_error, doc.parsed_value.is_some()) {
            (Some(e), _) => format!("{}{}", STATUS_ERROR_PREFIX, e),
            (None, true) => STATUS_LOADED.to_string(),
            (None, false) => STATUS_READY.to_string(),
        };
        Self {
            status,
            source_name: doc.source_name.clone().unwrap_or_default(),
            is_dirty: doc.is_dirty,
            is_valid: doc.is_valid,
            error_text: doc.last_error.clone().unwrap_or_default(),
            line_count: doc.current_text.lines().count(),
            char_count: doc.current_text.chars().count(),
            last_saved_text: format_last_saved(doc.last_saved_at),
        }
    }
}

/// 最近保存时间的相对描述（工具栏用）
pub fn format_last_saved(at: Option<SystemTime>) -> String {
    let Some(at) = at else {
        return "从未保存".to_string();
    };
    let secs = SystemTime::now()
        .duration_since(at)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    if secs < 60 {
        "刚刚".to_string()
    } else if secs < 3600 {
        format!("{} 分钟前", secs / 60)
    } else if secs < 86400 {
        format!("{} 小时前", secs / 3600)
    } else {
        format!("{} 天前", secs / 86400)
    }
}

/// 字符串页签内容：有效时为转义字符串，无效时为修正提示
pub fn escaped_preview(session: &EditorSession) -> String {
    match session.copy_escaped() {
        Ok(escaped) => escaped,
        Err(_) => INVALID_PREVIEW_NOTICE.to_string(),
    }
}
