use crate::models::Severity;

pub type Rgb = (u8, u8, u8);

/// Convert a `#rrggbb` literal into an RGB triple.
///
/// Evaluated at compile time for the palette constants below; panics on a
/// malformed literal.
pub const fn hex(code: &str) -> Rgb {
    let bytes = code.as_bytes();
    assert!(bytes.len() == 7 && bytes[0] == b'#', "expected #rrggbb");
    (
        nibble(bytes[1]) * 16 + nibble(bytes[2]),
        nibble(bytes[3]) * 16 + nibble(bytes[4]),
        nibble(bytes[5]) * 16 + nibble(bytes[6]),
    )
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit"),
    }
}

// Dark dashboard theme
pub struct Colors;

impl Colors {
    pub const BG: Rgb = hex("#0f172a");
    pub const CARD_BG: Rgb = hex("#1e293b");
    pub const BORDER: Rgb = hex("#334155");
    pub const WHITE: Rgb = (255, 255, 255);
    pub const BLUE: Rgb = hex("#3b82f6");
    pub const MUTED: Rgb = hex("#94a3b8");
    pub const GREEN: Rgb = hex("#4ade80");
    pub const RED: Rgb = hex("#f87171");
    pub const RED_SOLID: Rgb = hex("#ef4444");
    pub const YELLOW: Rgb = hex("#fef08a");
    pub const FOOTER: Rgb = hex("#64748b");
    pub const BAR_TRACK: Rgb = hex("#374151");
    pub const PURPLE: Rgb = hex("#a855f6");
    pub const AMBER: Rgb = hex("#f59e0b");

    /// Series colors for multi-series charts, cycled by series index.
    pub const SERIES: [Rgb; 5] = [Self::BLUE, Self::GREEN, Self::PURPLE, Self::AMBER, Self::RED];

    pub fn series(index: usize) -> Rgb {
        Self::SERIES[index % Self::SERIES.len()]
    }

    pub fn severity_text(severity: Severity) -> Rgb {
        match severity {
            Severity::Critical => hex("#fecaca"),
            Severity::High => hex("#fed7aa"),
            Severity::Medium => hex("#fef08a"),
            Severity::Low => hex("#bbf7d0"),
            Severity::Info => hex("#93c5fd"),
        }
    }

    pub fn severity_bar(severity: Severity) -> Rgb {
        match severity {
            Severity::Critical => hex("#dc2626"),
            Severity::High => hex("#ea580c"),
            Severity::Medium => hex("#ca8a04"),
            Severity::Low => hex("#16a34a"),
            Severity::Info => hex("#2563eb"),
        }
    }
}

/// Rates at or above this are rendered green.
pub const RATE_GOOD: f64 = 80.0;
/// Rates at or above this (and below `RATE_GOOD`) are rendered yellow.
pub const RATE_WARN: f64 = 60.0;
/// Summary cards flag a remediation rate below this value.
pub const REMEDIATION_HIGHLIGHT_BELOW: f64 = 70.0;
/// Risk scores above this value (0-10 scale) are flagged red.
pub const RISK_HIGH_ABOVE: f64 = 7.0;
pub const RISK_ELEVATED_ABOVE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    Good,
    Warn,
    Bad,
}

impl RateBand {
    pub fn of(rate: f64) -> Self {
        if rate >= RATE_GOOD {
            RateBand::Good
        } else if rate >= RATE_WARN {
            RateBand::Warn
        } else {
            RateBand::Bad
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            RateBand::Good => Colors::GREEN,
            RateBand::Warn => Colors::YELLOW,
            RateBand::Bad => Colors::RED,
        }
    }
}

/// Green / yellow / red for a percentage.
pub fn rate_color(rate: f64) -> Rgb {
    RateBand::of(rate).color()
}

pub fn is_high_risk(score: f64) -> bool {
    score > RISK_HIGH_ABOVE
}

pub fn risk_color(score: f64) -> Rgb {
    if is_high_risk(score) {
        Colors::RED
    } else if score > RISK_ELEVATED_ABOVE {
        Colors::YELLOW
    } else {
        Colors::GREEN
    }
}

pub fn remediation_needs_attention(rate: f64) -> bool {
    rate < REMEDIATION_HIGHLIGHT_BELOW
}
