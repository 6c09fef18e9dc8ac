//! # 结论渲染模块
//!
//! ## 设计思路
//!
//! 渲染是输入的纯函数：同一 `AnalysisOutcome` 总是得到同一 `ResultView`，无隐藏状态。
//!
//! - 错误：只展示消息，不渲染得分网格
//! - 结论：标签原样展示（以服务为准）、综合得分保留 3 位小数（缺失为 `0.000`）、
//!   各维度按服务返回顺序逐条展示
//!
//! `ResultView` 可序列化给前端，也实现了 `Display` 供文本界面与日志使用。

use std::fmt;

use serde::Serialize;

use crate::analysis::{AnalysisOutcome, ScoreValue, SectorScore};

/// 分析进行中的提示文案。
pub const LOADING_BANNER: &str = "分析中...";

/// 单个维度的展示条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorView {
    pub sector: String,
    pub score: String,
    pub reason: String,
}

/// 渲染产物。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultView {
    Error {
        message: String,
    },
    Verdict {
        label: String,
        ensemble_score: String,
        sectors: Vec<SectorView>,
    },
}

pub fn render(outcome: &AnalysisOutcome) -> ResultView {
    match outcome {
        AnalysisOutcome::Error(error) => ResultView::Error {
            message: error.message.clone(),
        },
        AnalysisOutcome::Result(result) => ResultView::Verdict {
            label: result.overall_label.clone(),
            ensemble_score: format_score(result.ensemble_score),
            sectors: result.sector_scores.iter().map(render_sector).collect(),
        },
    }
}

/// 在途时展示的提示。
pub fn render_loading() -> &'static str {
    LOADING_BANNER
}

/// 固定 3 位小数；缺失或非有限值按 0 处理，负零显示为 `0.000`。
pub fn format_score(value: Option<f64>) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0) + 0.0;
    format!("{:.3}", value)
}

fn render_sector(sector: &SectorScore) -> SectorView {
    SectorView {
        sector: sector.sector.clone(),
        score: format_sector_score(sector.score.as_ref()),
        reason: sector.reason.clone(),
    }
}

/// 数字与可解析的字符串统一格式化，无法解析的字符串原样保留。
fn format_sector_score(score: Option<&ScoreValue>) -> String {
    match score {
        Some(ScoreValue::Number(value)) => format_score(Some(*value)),
        Some(ScoreValue::Text(text)) => match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => format_score(Some(value)),
            _ => text.clone(),
        },
        None => format_score(None),
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { message } => write!(f, "{}", message),
            Self::Verdict {
                label,
                ensemble_score,
                sectors,
            } => {
                writeln!(f, "鉴定结论：{}", label)?;
                write!(f, "综合得分：{}", ensemble_score)?;
                for sector in sectors {
                    write!(
                        f,
                        "\n- {}  得分：{}\n  {}",
                        sector.sector, sector.score, sector.reason
                    )?;
                }
                Ok(())
            }
        }
    }
}
