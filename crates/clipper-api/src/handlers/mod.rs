//! Request handlers.

pub mod download;
pub mod health;
pub mod process;
pub mod status;
pub mod upload;

/// Reduce a client-supplied filename to a safe basename.
///
/// Path separators and anything outside `[A-Za-z0-9._-]` become
/// underscores; leading dots are stripped so the result can never
/// escape its directory or hide as a dotfile.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_filename("video.mp4"), "video.mp4");
        assert_eq!(sanitize_filename("My Clip (1).mp4"), "My_Clip__1_.mp4");
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("..\\secret.mp4"), "_secret.mp4");
        assert_eq!(sanitize_filename(".hidden.mp4"), "hidden.mp4");
    }

    #[test]
    fn test_sanitize_unicode() {
        assert_eq!(sanitize_filename("vidéo.mp4"), "vid_o.mp4");
    }
}
