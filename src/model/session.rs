//! EditorSession：文档状态机（加载 → 编辑 → 校验 → 保存）与协作方接口

use std::time::SystemTime;

use jsonpath_rust::{query::queryable::Queryable, JsonPath};
use serde_json::Value;
use thiserror::Error;

use crate::model::shadow_tree::{
    apply_expansion_visibility, build_shadow_tree, split_parent, PathSegment, TreeNode,
};
use crate::model::transcode;

/// 保存降级为下载且来源名未知时的建议文件名
const FALLBACK_SAVE_NAME: &str = "edited-config.txt";
/// 导出产物的固定文件名（与来源文件名无关）
const EXPORT_NAME: &str = "exported-data.json";
/// 编辑器文本的格式化缩进宽度
const EDITOR_INDENT: usize = 2;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("状态错误: {0}")]
    State(String),
    #[error("剪贴板错误: {0}")]
    Clipboard(String),
}

/// 直接回写能力：由来源方提供的不透明写入句柄
///
/// 并非所有来源都支持（粘贴内容就没有），缺失时保存走下载降级路径
pub trait WriteTarget: std::fmt::Debug {
    fn write_text(&mut self, text: &str) -> Result<(), AppError>;
}

/// 下载式输出能力：接收字节负载、MIME标签与建议文件名
pub trait DownloadSink {
    fn offer(&mut self, payload: &[u8], mime: &str, suggested_name: &str)
        -> Result<(), AppError>;
}

/// 一次成功保存实际走的路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 通过写入句柄直接回写到来源
    DirectWrite,
    /// 句柄缺失或写入失败，降级为下载产物
    Download,
}

/// 当前加载的文档及其全部状态
///
/// parsed_value 仅在 is_valid 为真时存在；is_valid 在每次编辑时同步重算
#[derive(Debug, Default)]
pub struct Document {
    /// 加载时的原始文本，逐字保留；保存成功后更新为最新的转义串
    pub original_text: String,
    /// 编辑器中的文本（格式化JSON，用户可改）
    pub current_text: String,
    pub parsed_value: Option<Value>,
    pub is_dirty: bool,
    pub is_valid: bool,
    /// 最近一次解析/校验失败的消息，供状态栏展示
    pub last_error: Option<String>,
    /// 来源名称（文件名等）
    pub source_name: Option<String>,
    pub last_saved_at: Option<SystemTime>,
    /// 直接回写句柄；来源不支持时为空
    pub write_handle: Option<Box<dyn WriteTarget>>,
}

/// 编辑会话：持有唯一的文档实例与其影子树索引
///
/// 所有操作在单一执行上下文中顺序完成；保存在调用协作方之前
/// 固定好本次要写出的文本快照，之后的新编辑不影响已发起的保存。
#[derive(Debug, Default)]
pub struct EditorSession {
    pub doc: Document,
    /// 解析值的扁平导航索引；文档无效时为空
    pub tree_flat: Vec<TreeNode>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载外部文本（文件内容或粘贴内容）
    ///
    /// 解码成功时 original_text 保留输入原文（不是格式化结果），
    /// current_text 为两空格缩进的格式化文本。解码失败时原文进入
    /// current_text 供用户修正，会话保持可用，但需要有效文档的
    /// 操作（保存、导出、复制转义串）会被拒绝。
    pub fn load(
        &mut self,
        text: &str,
        source_name: Option<String>,
        write_handle: Option<Box<dyn WriteTarget>>,
    ) -> Result<(), AppError> {
        self.doc.source_name = source_name;
        self.doc.write_handle = write_handle;
        self.doc.original_text = text.to_string();
        self.doc.is_dirty = false;
        match transcode::decode(text) {
            Ok(value) => {
                self.doc.current_text = transcode::pretty_print(&value, EDITOR_INDENT)?;
                self.doc.parsed_value = Some(value);
                self.doc.is_valid = true;
                self.doc.last_error = None;
                self.doc.last_saved_at = Some(SystemTime::now());
                self.rebuild_tree();
                tracing::info!("文档加载成功: {} 个节点", self.tree_flat.len());
                Ok(())
            }
            Err(e) => {
                self.doc.current_text = text.to_string();
                self.doc.parsed_value = None;
                self.doc.is_valid = false;
                self.doc.last_error = Some(e.to_string());
                self.doc.last_saved_at = None;
                self.tree_flat.clear();
                tracing::warn!("文档加载失败: {}", e);
                Err(e)
            }
        }
    }

    /// 编辑器内容变更：无条件置脏，并同步重算有效性
    ///
    /// 内容是已解包的JSON文本，这里做纯语法解析而不是转义串解码；
    /// 解析通过时一并刷新 parsed_value 与影子树。
    pub fn edit(&mut self, new_text: &str) {
        self.doc.current_text = new_text.to_string();
        self.doc.is_dirty = true;
        match transcode::validate(new_text) {
            Ok(value) => {
                self.doc.parsed_value = Some(value);
                self.doc.is_valid = true;
                self.doc.last_error = None;
                self.rebuild_tree();
            }
            Err(e) => {
                self.doc.parsed_value = None;
                self.doc.is_valid = false;
                self.doc.last_error = Some(e.to_string());
                self.tree_flat.clear();
            }
        }
    }

    /// 保存：优先通过写入句柄直接回写，任何直写失败都降级为下载
    ///
    /// 两条路径成功后 original_text 更新为本次写出的转义串、清除脏标记；
    /// 降级路径也失败时返回错误且文档状态不变。
    pub fn save(&mut self, fallback: &mut dyn DownloadSink) -> Result<SaveOutcome, AppError> {
        self.ensure_valid("保存")?;
        // 写出内容在这里定格，句柄写入期间的新编辑不影响本次保存
        let parsed: Value = serde_json::from_str(&self.doc.current_text)?;
        let escaped = transcode::encode(&parsed)?;
        let suggested = self
            .doc
            .source_name
            .clone()
            .unwrap_or_else(|| FALLBACK_SAVE_NAME.to_string());

        let outcome = match self.doc.write_handle.as_mut() {
            Some(handle) => match handle.write_text(&escaped) {
                Ok(()) => SaveOutcome::DirectWrite,
                Err(e) => {
                    tracing::warn!("直接回写失败，降级为下载: {}", e);
                    fallback.offer(escaped.as_bytes(), "text/plain", &suggested)?;
                    SaveOutcome::Download
                }
            },
            None => {
                fallback.offer(escaped.as_bytes(), "text/plain", &suggested)?;
                SaveOutcome::Download
            }
        };

        self.doc.original_text = escaped;
        self.doc.parsed_value = Some(parsed);
        self.doc.is_dirty = false;
        self.doc.last_saved_at = Some(SystemTime::now());
        tracing::info!("保存完成: {:?}", outcome);
        Ok(outcome)
    }

    /// 导出当前格式化文本（非转义形式），不改变文档状态
    pub fn export(&self, sink: &mut dyn DownloadSink) -> Result<(), AppError> {
        self.ensure_valid("导出")?;
        sink.offer(
            self.doc.current_text.as_bytes(),
            "application/json",
            EXPORT_NAME,
        )?;
        tracing::info!("已导出 {} 字节", self.doc.current_text.len());
        Ok(())
    }

    /// 放弃全部编辑，回到最近一次成功加载/保存的状态
    ///
    /// original_text 在上次加载/保存时已通过校验，正常流程解码不会失败；
    /// 万一失败则静默跳过。是否需要用户确认由调用方负责。
    pub fn reset(&mut self) {
        let value = match transcode::decode(&self.doc.original_text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("重置被跳过，原始文本不可解码: {}", e);
                return;
            }
        };
        let pretty = match transcode::pretty_print(&value, EDITOR_INDENT) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("重置被跳过，格式化失败: {}", e);
                return;
            }
        };
        self.doc.current_text = pretty;
        self.doc.parsed_value = Some(value);
        self.doc.is_dirty = false;
        self.doc.is_valid = true;
        self.doc.last_error = None;
        self.rebuild_tree();
    }

    /// 生成当前内容的转义字符串，供调用方放入剪贴板；不改状态
    pub fn copy_escaped(&self) -> Result<String, AppError> {
        self.ensure_valid("复制转义串")?;
        let parsed: Value = serde_json::from_str(&self.doc.current_text)?;
        transcode::encode(&parsed)
    }

    /// 读取某节点用于编辑的初始文本：字符串值给原文，其余给紧凑JSON
    pub fn node_edit_text(&self, json_path: &str) -> Result<String, AppError> {
        let dom = self.require_dom()?;
        let hits: Vec<&Value> = dom
            .query(json_path)
            .map_err(|e| AppError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| AppError::JsonPath("未匹配到任何节点".into()))?;
        match first {
            Value::String(s) => Ok(s.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }

    /// 将 raw 写入第一个匹配 json_path 的节点
    ///
    /// raw 优先按JSON解析；解析不动时按纯字符串值处理，
    /// 这样在树上把 42 改成 hello 不需要用户手动补引号。
    pub fn update_node(&mut self, json_path: &str, raw: &str) -> Result<(), AppError> {
        let replacement: Value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        {
            let dom = self
                .doc
                .parsed_value
                .as_mut()
                .ok_or_else(|| AppError::State("文档无效或尚未加载".into()))?;
            let paths: Vec<String> = dom
                .query_only_path(json_path)
                .map_err(|e| AppError::JsonPath(e.to_string()))?;
            let Some(p) = paths.into_iter().next() else {
                return Err(AppError::JsonPath("未匹配到可更新路径".into()));
            };
            let Some(slot) = dom.reference_mut(&p) else {
                return Err(AppError::JsonPath(format!("路径不可更新: {}", p)));
            };
            *slot = replacement;
        }
        self.refresh_after_mutation()
    }

    /// 删除第一个匹配 json_path 的节点；根节点拒绝删除
    pub fn delete_node(&mut self, json_path: &str) -> Result<(), AppError> {
        {
            let dom = self
                .doc
                .parsed_value
                .as_mut()
                .ok_or_else(|| AppError::State("文档无效或尚未加载".into()))?;
            let paths: Vec<String> = dom
                .query_only_path(json_path)
                .map_err(|e| AppError::JsonPath(e.to_string()))?;
            let Some(p) = paths.into_iter().next() else {
                return Err(AppError::JsonPath("未匹配到可删除路径".into()));
            };
            let Some((parent_path, segment)) = split_parent(&p) else {
                return Err(AppError::JsonPath("根节点不可删除".into()));
            };
            let Some(parent) = dom.reference_mut(&parent_path) else {
                return Err(AppError::JsonPath(format!("父路径不可访问: {}", parent_path)));
            };
            match (parent, segment) {
                (Value::Object(map), PathSegment::Key(key)) => {
                    // shift_remove 保持剩余键的插入顺序
                    if map.shift_remove(&key).is_none() {
                        return Err(AppError::JsonPath(format!("键不存在: {}", key)));
                    }
                }
                (Value::Array(items), PathSegment::Index(idx)) => {
                    if idx >= items.len() {
                        return Err(AppError::JsonPath(format!("数组下标越界: {}", idx)));
                    }
                    items.remove(idx);
                }
                _ => {
                    return Err(AppError::JsonPath(format!("路径与父节点类型不符: {}", p)));
                }
            }
        }
        self.refresh_after_mutation()
    }

    /// 切换节点展开状态并刷新可见性
    pub fn toggle_node_expanded(&mut self, json_path: &str) {
        if let Some(node) = self.tree_flat.iter_mut().find(|n| n.path == json_path) {
            node.expanded = !node.expanded;
        }
        apply_expansion_visibility(&mut self.tree_flat);
    }

    fn require_dom(&self) -> Result<&Value, AppError> {
        self.doc
            .parsed_value
            .as_ref()
            .ok_or_else(|| AppError::State("文档无效或尚未加载".into()))
    }

    fn ensure_valid(&self, op: &str) -> Result<(), AppError> {
        if self.doc.is_valid {
            Ok(())
        } else {
            Err(AppError::State(format!("{}被拒绝: 当前文档无效", op)))
        }
    }

    /// 节点级修改后的统一收尾：重渲染编辑文本、置脏、重建影子树
    fn refresh_after_mutation(&mut self) -> Result<(), AppError> {
        let text = {
            let value = self.require_dom()?;
            transcode::pretty_print(value, EDITOR_INDENT)?
        };
        self.doc.current_text = text;
        self.doc.is_dirty = true;
        self.doc.is_valid = true;
        self.doc.last_error = None;
        self.rebuild_tree();
        Ok(())
    }

    /// 从 parsed_value 重建影子树，根节点默认展开
    fn rebuild_tree(&mut self) {
        self.tree_flat = match self.doc.parsed_value.as_ref() {
            Some(value) => build_shadow_tree(value),
            None => Vec::new(),
        };
        if let Some(root) = self.tree_flat.first_mut() {
            root.expanded = true;
        }
        apply_expansion_visibility(&mut self.tree_flat);
    }
}
