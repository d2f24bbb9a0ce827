use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ApiError;

const IMAGES_SUBDIR: &str = "images";
const ALLOWED_IMAGE_EXTS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Blob store for post images: `store(bytes, name) -> path ref`. Files land
/// under `<root>/images`, refs look like `static/images/<name>` and are what
/// the posts table records.
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn new_from_env() -> Self {
        Self::new(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()))
    }

    /// Writes the image and returns its path ref. The client filename is
    /// reduced to its final path component, so `../../x.png` cannot escape
    /// the image directory; the stored name is prefixed with the uploader's
    /// id, as `{user_id}_{name}`.
    pub fn store(&self, user_id: i32, filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
        if !is_allowed_image(filename) {
            return Err(ApiError::UnsupportedImageFormat);
        }

        let dir = self.root.join(IMAGES_SUBDIR);
        fs::create_dir_all(&dir)?;

        let stored_name = format!("{}_{}", user_id, sanitize_filename(filename));
        fs::write(dir.join(&stored_name), bytes)?;

        Ok(format!("static/{}/{}", IMAGES_SUBDIR, stored_name))
    }

    /// Best-effort removal of a previously stored ref, for rolling back a
    /// file write whose post never made it to the database.
    pub fn remove(&self, path_ref: &str) {
        let name = path_ref.rsplit('/').next().unwrap_or(path_ref);
        let path = self.root.join(IMAGES_SUBDIR).join(sanitize_filename(name));
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("could not remove {}: {}", path.display(), e);
        }
    }

    /// Disk path for a stored image name, sanitized the same way as on the
    /// write side.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.root
            .join(IMAGES_SUBDIR)
            .join(sanitize_filename(filename))
    }
}

fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string()
}

fn is_allowed_image(filename: &str) -> bool {
    match image_extension(filename) {
        Some(ext) => ALLOWED_IMAGE_EXTS.contains(&ext.as_str()),
        None => false,
    }
}

fn image_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn content_type_for(filename: &str) -> mime::Mime {
    match image_extension(filename).as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_writes_file_and_embeds_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path_ref = store.store(7, "photo.png", b"png-bytes").unwrap();
        assert_eq!(path_ref, "static/images/7_photo.png");

        let on_disk = dir.path().join("images").join("7_photo.png");
        assert_eq!(fs::read(on_disk).unwrap(), b"png-bytes");
    }

    #[test]
    fn store_rejects_unsupported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store.store(1, "photo.bmp", b"x"),
            Err(ApiError::UnsupportedImageFormat)
        ));
        assert!(matches!(
            store.store(1, "noextension", b"x"),
            Err(ApiError::UnsupportedImageFormat)
        ));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path_ref = store.store(2, "photo.PNG", b"x").unwrap();
        assert_eq!(path_ref, "static/images/2_photo.PNG");
    }

    #[test]
    fn traversal_components_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path_ref = store.store(3, "../../etc/passwd.png", b"x").unwrap();
        assert_eq!(path_ref, "static/images/3_passwd.png");
        assert!(dir.path().join("images").join("3_passwd.png").exists());
    }

    #[test]
    fn remove_deletes_a_stored_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path_ref = store.store(4, "gone.gif", b"x").unwrap();
        store.remove(&path_ref);
        assert!(!dir.path().join("images").join("4_gone.gif").exists());
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a.jpg"), mime::IMAGE_JPEG);
        assert_eq!(content_type_for("a.jpeg"), mime::IMAGE_JPEG);
        assert_eq!(content_type_for("a.png"), mime::IMAGE_PNG);
        assert_eq!(content_type_for("a.gif"), mime::IMAGE_GIF);
        assert_eq!(content_type_for("a.bin"), mime::APPLICATION_OCTET_STREAM);
    }
}
