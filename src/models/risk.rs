use serde::Serialize;

/// Ordered risk bands derived from a trailing-window average score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Mild,
    Normal,
}

/// Advisory derived from an average emotion score. Recomputed per request,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub message: &'static str,
}

impl RiskAssessment {
    /// Maps an average score to its band. Lower bounds are inclusive, so
    /// exactly 20/40/60 land in the less severe band. Scores outside
    /// [0,100] are tolerated rather than rejected.
    pub fn for_average(avg_score: f64) -> Self {
        if avg_score < 20.0 {
            Self {
                level: RiskLevel::High,
                message: "คะแนนอารมณ์ต่ำมาก แสดงว่ามีความเสี่ยงสูงที่จะเป็นภาวะซึมเศร้า ควรรีบพบผู้เชี่ยวชาญหรือนักจิตวิทยา",
            }
        } else if avg_score < 40.0 {
            Self {
                level: RiskLevel::Medium,
                message: "คะแนนอารมณ์อยู่ในระดับปานกลาง อาจมีความเครียดหรือวิตกกังวล ควรดูแลสุขภาพจิตอย่างใกล้ชิด",
            }
        } else if avg_score < 60.0 {
            Self {
                level: RiskLevel::Mild,
                message: "คะแนนอารมณ์อยู่ในระดับพึ่งเริ่ม เข้าค่ายที่จะเป็นภาวะซึมเศร้า อาจมีความเครียดหรือวิตกกังวล",
            }
        } else {
            Self {
                level: RiskLevel::Normal,
                message: "คะแนนอารมณ์อยู่ในระดับปกติ ไม่มีความเสี่ยงซึมเศร้าในระดับน่ากังวล",
            }
        }
    }
}
