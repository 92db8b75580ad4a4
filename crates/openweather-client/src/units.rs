//! Condition icon URLs

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Rendered size of a condition icon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IconSize {
    X1,
    #[default]
    X2,
    X4,
}

/// URL of the PNG for a provider icon code such as `10d`
pub fn icon_url(icon: &str, size: IconSize) -> String {
    let suffix = match size {
        IconSize::X1 => "",
        IconSize::X2 => "@2x",
        IconSize::X4 => "@4x",
    };
    format!("{ICON_BASE_URL}/{icon}{suffix}.png")
}
