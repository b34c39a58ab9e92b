// ==========================================
// 游戏收藏导入系统 - 列映射建议
// ==========================================
// 职责: 根据表头名称为每个目标字段推荐源列
// 说明: 基于单元格内容的推断由外部分析器实现同一 trait
// ==========================================

use crate::domain::sheet::Sheet;
use crate::domain::types::TargetField;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// 备选列数量
const MAX_ALTERNATIVES: usize = 2;

/// 模糊匹配的最低相似度（Jaro-Winkler 对短词过于宽松，低于此值不计分）
const MIN_FUZZY_SIMILARITY: f64 = 0.85;

/// 表头按词包含别名时的得分
const WORD_MATCH_SCORE: u8 = 90;

/// 占位表头前缀（外部解析器为空表头生成）
const PLACEHOLDER_HEADER_PREFIX: &str = "unnamed:";

/// 单字段映射建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMappingProposal {
    pub field: TargetField,
    pub column: Option<String>,
    /// 0-100
    pub confidence: u8,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// 映射建议来源
pub trait FieldMappingProposalSource: Send + Sync {
    fn propose(&self, sheet: &Sheet) -> Vec<FieldMappingProposal>;
}

// ==========================================
// HeaderProposer - 表头名称模糊匹配
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderProposer;

impl HeaderProposer {
    /// 每个目标字段的常见表头别名（西语 / 英语）
    pub fn aliases(field: TargetField) -> &'static [&'static str] {
        match field {
            TargetField::Title => &["Title", "Name", "Título", "Juego", "Game", "Nombre"],
            TargetField::Status => &["Status", "Estado", "Lista", "List"],
            TargetField::HypeScore => &["Hype", "Ganas", "Score", "Puntuación"],
            TargetField::Rating => &["Rating", "Nota", "Score", "Puntuación"],
            TargetField::Progress => &["Progress", "Progreso", "Estado Juego"],
            TargetField::PlaytimeHours => &["Playtime", "Horas", "Tiempo", "Hours", "Duration"],
            TargetField::FinishYear => &["Finish Year", "Año Terminado", "Terminado", "Finished"],
            TargetField::ReleaseYear => {
                &["Release Year", "Año Lanzamiento", "Lanzamiento", "Released"]
            }
            TargetField::Price => &["Price", "Precio", "Coste"],
            TargetField::Platform => &["Platform", "Plataforma", "Consola", "System"],
            TargetField::SteamDeck => &["Steam Deck", "Deck", "Portable"],
            TargetField::Notes => &["Notes", "Notas", "Comentarios"],
        }
    }

    /// 表头与字段的相似度（0-100）
    ///
    /// # 说明
    /// - 与别名完全一致: 100
    /// - 表头按词包含别名（如 "Nota final"）: 90
    /// - 其余按 Jaro-Winkler 相似度，低于 MIN_FUZZY_SIMILARITY 记 0
    pub fn score(field: TargetField, header: &str) -> u8 {
        let normalized = header.trim().to_lowercase();
        let words = split_words(&normalized);

        Self::aliases(field)
            .iter()
            .map(|alias| {
                let alias = alias.to_lowercase();
                if normalized == alias {
                    return 100;
                }
                if contains_words(&words, &split_words(&alias)) {
                    return WORD_MATCH_SCORE;
                }
                let similarity = jaro_winkler(&normalized, &alias);
                if similarity >= MIN_FUZZY_SIMILARITY {
                    (similarity * 100.0).clamp(0.0, 100.0) as u8
                } else {
                    0
                }
            })
            .max()
            .unwrap_or(0)
    }

    fn is_placeholder(header: &str) -> bool {
        let trimmed = header.trim();
        trimmed.is_empty() || trimmed.to_lowercase().starts_with(PLACEHOLDER_HEADER_PREFIX)
    }
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// 别名的词序列是否连续出现在表头中
fn contains_words(header_words: &[&str], alias_words: &[&str]) -> bool {
    !alias_words.is_empty()
        && header_words
            .windows(alias_words.len())
            .any(|window| window == alias_words)
}

impl FieldMappingProposalSource for HeaderProposer {
    fn propose(&self, sheet: &Sheet) -> Vec<FieldMappingProposal> {
        let headers: Vec<&String> = sheet
            .headers
            .iter()
            .filter(|h| !Self::is_placeholder(h))
            .collect();

        TargetField::ALL
            .iter()
            .map(|field| {
                let mut scored: Vec<(u8, &String)> = headers
                    .iter()
                    .map(|h| (Self::score(*field, h), *h))
                    .collect();
                scored.sort_by(|a, b| b.0.cmp(&a.0));

                let mut ranked = scored.into_iter();
                let (confidence, column) = match ranked.next() {
                    Some((score, header)) => (score, Some(header.clone())),
                    None => (0, None),
                };

                FieldMappingProposal {
                    field: *field,
                    column,
                    confidence,
                    alternatives: ranked
                        .take(MAX_ALTERNATIVES)
                        .map(|(_, h)| h.clone())
                        .collect(),
                }
            })
            .collect()
    }
}
