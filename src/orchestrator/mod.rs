//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责应用生命周期和一次生成请求的整体调度。
//!
//! ## 模块划分
//!
//! ### `server` - 服务入口
//! - 管理应用生命周期（初始化、运行）
//! - 选择并持有问题生成器
//! - 启动 HTTP 服务
//!
//! ### `quiz_generator` - 测验生成器
//! - 切分段落、建立候选词索引（每个请求一次）
//! - 逐个版本调用 `VarietySelector`
//! - 把选择器的失败映射为请求级别的 `GenerationError`
//!
//! ## 层次关系
//!
//! ```text
//! server (进程级，持有共享资源)
//!     ↓
//! api (处理单个 HTTP 请求)
//!     ↓
//! quiz_generator (处理 Vec<QuizInstance>)
//!     ↓
//! workflow::VarietySelector (处理单个版本)
//!     ↓
//! services (能力层：segmenter / candidate_extractor / item_builder / phraser)
//! ```

pub mod quiz_generator;
pub mod server;

// 重新导出主要类型
pub use quiz_generator::QuizGenerator;
pub use server::App;
