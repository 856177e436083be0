use arboard::Clipboard;

/// Puts `text` on the system clipboard and returns it.
pub fn copy_to_clipboard(text: &str) -> Result<String, String> {
    let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())?;
    Ok(text.to_string())
}
