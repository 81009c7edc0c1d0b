//! IO边界：来源文本读取、直接回写句柄与目录式下载端

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::session::{AppError, DownloadSink, WriteTarget};

/// 读取来源文件的原始文本
///
/// 解码需要逐字原文，这里不做任何解析或规整
pub fn read_text_file(p: &Path) -> Result<String, AppError> {
    Ok(fs::read_to_string(p)?)
}

/// 指向来源文件的直接回写句柄
#[derive(Debug, Clone)]
pub struct FileWriteTarget {
    path: PathBuf,
}

impl FileWriteTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WriteTarget for FileWriteTarget {
    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        fs::write(&self.path, text)?;
        tracing::info!("已回写到: {}", self.path.display());
        Ok(())
    }
}

/// 把"提供下载"落到本地目录的输出端：按建议文件名写入固定目录
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn offer(&mut self, payload: &[u8], mime: &str, suggested_name: &str) -> Result<(), AppError> {
        let target = self.dir.join(suggested_name);
        fs::write(&target, payload)?;
        tracing::info!("已生成下载产物: {} ({})", target.display(), mime);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_read_text_file_verbatim() {
        let raw = "  \"{\\\"a\\\":1}\"  \n";
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(raw.as_bytes()).expect("写入临时文件失败");

        let text = read_text_file(file.path()).expect("读取应该成功");
        assert_eq!(text, raw, "读取不应改动原文");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = read_text_file(Path::new("/不存在/的/路径.txt"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_file_write_target_overwrites() {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(b"old").expect("写入临时文件失败");

        let mut target = FileWriteTarget::new(file.path());
        target.write_text("\"{}\"").expect("回写应该成功");

        let on_disk = fs::read_to_string(file.path()).expect("读取应该成功");
        assert_eq!(on_disk, "\"{}\"", "回写应整体替换文件内容");
    }

    #[test]
    fn test_directory_sink_uses_suggested_name() {
        let dir = tempdir().expect("创建临时目录失败");
        let mut sink = DirectorySink::new(dir.path());
        sink.offer(b"payload", "text/plain", "edited-config.txt")
            .expect("下载端写入应该成功");

        let on_disk = fs::read(dir.path().join("edited-config.txt")).expect("读取应该成功");
        assert_eq!(on_disk, b"payload");
    }
}
