#![forbid(unsafe_code)]

//! HUD markup assembly for a whole menu.

use hudmenu_core::{InputMode, KeyProfile};

const TITLE_COLOR: &str = "#FFFFFF";
const FOOTER_KEY_COLOR: &str = "#FF0000";
const ROW_INDENT: &str = "\u{a0}\u{a0}\u{a0} ";

/// Title line, with a `[n/total]` counter when the list is paged.
#[must_use]
pub fn title_line(title: &str, counter: Option<(usize, usize)>) -> String {
    let mut out = format!("<font class='fontSize-m' color='{TITLE_COLOR}'>{title}</font>");
    if let Some((position, total)) = counter {
        out.push_str(&format!(
            "<font class='fontSize-s' color='{TITLE_COLOR}'> [{position}/{total}]</font>"
        ));
    }
    out.push_str("<br>");
    out
}

/// One option row with its arrow or indent.
#[must_use]
pub fn row_line(body: &str, is_arrow: bool, prefix: &str, navigation_color: &str) -> String {
    if is_arrow {
        format!("<font color='{navigation_color}' class='fontSize-sm'>{prefix} </font>{body}")
    } else {
        format!("{ROW_INDENT}{body}")
    }
}

/// `Move / Use / Exit` hint for the active input profile.
#[must_use]
pub fn footer_line(mode: InputMode, profile: &KeyProfile) -> String {
    let (move_keys, use_key, exit_key) = match mode {
        InputMode::Wasd => ("W/S".to_owned(), "D".to_owned(), "A".to_owned()),
        InputMode::Button => (
            format!("{}/{}", profile.move_forward.label(), profile.move_back.label()),
            profile.select.label(),
            profile.exit.label(),
        ),
    };
    format!(
        "<br><font class='fontSize-s' color='{TITLE_COLOR}'>\
         <font color='{FOOTER_KEY_COLOR}'>Move:</font> {move_keys} | \
         <font color='{FOOTER_KEY_COLOR}'>Use:</font> {use_key} | \
         <font color='{FOOTER_KEY_COLOR}'>Exit:</font> {exit_key}</font>"
    )
}

/// Join title, rows and footer into the final markup.
#[must_use]
pub fn assemble(title: Option<&str>, rows: &[String], footer: Option<&str>) -> String {
    let body_len: usize = rows.iter().map(String::len).sum::<usize>() + rows.len() * 4;
    let mut out = String::with_capacity(body_len + 128);
    if let Some(title) = title {
        out.push_str(title);
    }
    out.push_str("<font color='#FFFFFF' class='fontSize-sm'>");
    out.push_str(&rows.join("<br>"));
    out.push_str("</font>");
    if let Some(footer) = footer {
        out.push_str(footer);
    }
    out
}
