//! 剪贴板边界：把转义字符串放入系统剪贴板

use crate::model::session::{AppError, EditorSession};

/// 将文本复制到系统剪贴板
pub fn copy_to_clipboard(text: &str) -> Result<(), AppError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    ctx.set_contents(text.to_string())
        .map_err(|e| AppError::Clipboard(e.to_string()))
}

/// 把会话当前内容的转义字符串放入剪贴板
///
/// 文档无效时返回状态错误，剪贴板不可用时返回剪贴板错误；
/// 两种失败都只需提示用户，不影响文档
pub fn copy_session_escaped(session: &EditorSession) -> Result<(), AppError> {
    let escaped = session.copy_escaped()?;
    copy_to_clipboard(&escaped)?;
    tracing::info!("转义串已复制到剪贴板，长度: {} 字符", escaped.len());
    Ok(())
}

/// 从系统剪贴板获取文本（用于测试）
#[cfg(test)]
pub fn get_clipboard_contents() -> Result<String, AppError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    ctx.get_contents()
        .map_err(|e| AppError::Clipboard(e.to_string()))
}
