//! Filesystem naming conventions (§6.1): menu and button titles prefixed
//! with their 1-based index, zero-padded to width 2.

use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

pub fn menu_dir_name(menu_index: usize, title: &str) -> String {
    format!("{:02}_{}", menu_index + 1, sanitize(title))
}

pub fn button_file_stem(button_index: usize, title: &str) -> String {
    format!("{:02}_{}", button_index + 1, sanitize(title))
}

fn sanitize(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    let collapsed = REPEATED_UNDERSCORES.replace_all(&cleaned, "_").into_owned();
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pads_to_width_two_and_is_one_based() {
        assert_eq!(menu_dir_name(0, "Intro"), "01_Intro");
        assert_eq!(button_file_stem(8, "Scene 9"), "09_Scene_9");
    }

    #[test]
    fn blank_title_falls_back_to_untitled() {
        assert_eq!(menu_dir_name(0, "???"), "01_untitled");
    }
}
