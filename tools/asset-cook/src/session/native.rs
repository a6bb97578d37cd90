//! Native backend: drives a cooker shared library through its C ABI.
//!
//! Expected exports, all returning 0 on success:
//!
//! ```c
//! int open_file(const char* path);
//! int cook_mesh(int id, const char* file, const char* node);
//! int cook_texture(int id, const char* file, int format);
//! int cook_skeleton(int id, const char* file, const char* node);
//! int cook_animation(int id, const char* file, const char* animation);
//! int cook_audio(int id, const char* file);
//! int cook_font(int id, const char* file);
//! int close_file(void);
//! ```

use std::ffi::{c_char, c_int, CString};
use std::path::{Path, PathBuf};

use cook_shared::{AssetCategory, AssetId, TextureFormat};
use libloading::{Library, Symbol};
use tracing::{debug, info};

use super::{CloseSummary, CookBackend, CookError, CookSession};

type OpenFileFn = unsafe extern "C" fn(*const c_char) -> c_int;
type CookNamedFn = unsafe extern "C" fn(c_int, *const c_char, *const c_char) -> c_int;
type CookTextureFn = unsafe extern "C" fn(c_int, *const c_char, c_int) -> c_int;
type CookFileFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
type CloseFileFn = unsafe extern "C" fn() -> c_int;

/// Resolved entry points. Only valid while `_lib` is loaded, so it is
/// declared last and dropped after the pointers.
struct CookerApi {
    open_file: OpenFileFn,
    cook_mesh: CookNamedFn,
    cook_texture: CookTextureFn,
    cook_skeleton: CookNamedFn,
    cook_animation: CookNamedFn,
    cook_audio: CookFileFn,
    cook_font: CookFileFn,
    close_file: CloseFileFn,
    _lib: Library,
}

impl CookerApi {
    fn load(path: &Path) -> Result<Self, String> {
        // SAFETY: loading runs the library's initializers; the caller names a
        // cooker library built for this ABI.
        unsafe {
            let lib = Library::new(path).map_err(|e| e.to_string())?;
            Ok(Self {
                open_file: symbol(&lib, b"open_file")?,
                cook_mesh: symbol(&lib, b"cook_mesh")?,
                cook_texture: symbol(&lib, b"cook_texture")?,
                cook_skeleton: symbol(&lib, b"cook_skeleton")?,
                cook_animation: symbol(&lib, b"cook_animation")?,
                cook_audio: symbol(&lib, b"cook_audio")?,
                cook_font: symbol(&lib, b"cook_font")?,
                close_file: symbol(&lib, b"close_file")?,
                _lib: lib,
            })
        }
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, String> {
    // SAFETY: `T` is one of the fn pointer aliases above, matching the export.
    let sym: Symbol<T> = unsafe { lib.get(name) }.map_err(|e| {
        format!(
            "missing symbol '{}': {}",
            String::from_utf8_lossy(name),
            e
        )
    })?;
    Ok(*sym)
}

/// Opens sessions on a cooker shared library.
#[derive(Debug, Clone)]
pub struct NativeBackend {
    library: PathBuf,
}

impl NativeBackend {
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
        }
    }
}

impl CookBackend for NativeBackend {
    type Session = NativeSession;

    fn open(&self, output: &Path) -> Result<NativeSession, CookError> {
        let open_error = |reason: String| CookError::Open {
            path: output.to_path_buf(),
            reason,
        };

        let api = CookerApi::load(&self.library)
            .map_err(|e| open_error(format!("{}: {}", self.library.display(), e)))?;
        let path = c_string(&output.to_string_lossy()).map_err(open_error)?;

        // SAFETY: `path` outlives the call.
        let code = unsafe { (api.open_file)(path.as_ptr()) };
        if code != 0 {
            return Err(open_error(format!("open_file returned {}", code)));
        }

        info!(
            "Opened {} via {}",
            output.display(),
            self.library.display()
        );
        Ok(NativeSession { api, cooked: 0 })
    }
}

pub struct NativeSession {
    api: CookerApi,
    cooked: usize,
}

impl NativeSession {
    fn check(
        &mut self,
        category: AssetCategory,
        id: AssetId,
        file: &str,
        code: c_int,
    ) -> Result<(), CookError> {
        status(category, id, file, code)?;
        debug!("Cooked {} {} from {}", category, id, file);
        self.cooked += 1;
        Ok(())
    }

    fn cook_named(
        &mut self,
        category: AssetCategory,
        f: CookNamedFn,
        id: AssetId,
        file: &str,
        name: &str,
    ) -> Result<(), CookError> {
        let c_file = c_string(file).map_err(|e| CookError::item(category, id, file, e))?;
        let c_name = c_string(name).map_err(|e| CookError::item(category, id, file, e))?;
        // SAFETY: both strings outlive the call.
        let code = unsafe { f(c_id(id), c_file.as_ptr(), c_name.as_ptr()) };
        self.check(category, id, file, code)
    }

    fn cook_file(
        &mut self,
        category: AssetCategory,
        f: CookFileFn,
        id: AssetId,
        file: &str,
    ) -> Result<(), CookError> {
        let c_file = c_string(file).map_err(|e| CookError::item(category, id, file, e))?;
        // SAFETY: `c_file` outlives the call.
        let code = unsafe { f(c_id(id), c_file.as_ptr()) };
        self.check(category, id, file, code)
    }
}

impl CookSession for NativeSession {
    fn cook_mesh(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        let f = self.api.cook_mesh;
        self.cook_named(AssetCategory::Mesh, f, id, file, node)
    }

    fn cook_texture(
        &mut self,
        id: AssetId,
        file: &str,
        format: TextureFormat,
    ) -> Result<(), CookError> {
        let category = AssetCategory::Texture;
        let c_file = c_string(file).map_err(|e| CookError::item(category, id, file, e))?;
        // SAFETY: `c_file` outlives the call.
        let code =
            unsafe { (self.api.cook_texture)(c_id(id), c_file.as_ptr(), format.code()) };
        self.check(category, id, file, code)
    }

    fn cook_skeleton(&mut self, id: AssetId, file: &str, node: &str) -> Result<(), CookError> {
        let f = self.api.cook_skeleton;
        self.cook_named(AssetCategory::Skeleton, f, id, file, node)
    }

    fn cook_animation(
        &mut self,
        id: AssetId,
        file: &str,
        animation: &str,
    ) -> Result<(), CookError> {
        let f = self.api.cook_animation;
        self.cook_named(AssetCategory::Animation, f, id, file, animation)
    }

    fn cook_audio(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        let f = self.api.cook_audio;
        self.cook_file(AssetCategory::Sound, f, id, file)
    }

    fn cook_font(&mut self, id: AssetId, file: &str) -> Result<(), CookError> {
        let f = self.api.cook_font;
        self.cook_file(AssetCategory::Font, f, id, file)
    }

    fn close(self) -> Result<CloseSummary, CookError> {
        // SAFETY: takes no arguments; the library is still loaded.
        let code = unsafe { (self.api.close_file)() };
        if code != 0 {
            return Err(CookError::Close(format!("close_file returned {}", code)));
        }
        info!("File closed ({} assets cooked)", self.cooked);
        Ok(CloseSummary {
            entries: self.cooked,
            bytes: 0,
        })
    }
}

/// Map a cooker return code to a per-item result. Zero is success.
fn status(category: AssetCategory, id: AssetId, file: &str, code: c_int) -> Result<(), CookError> {
    if code != 0 {
        return Err(CookError::item(
            category,
            id,
            file,
            format!("cooker returned {}", code),
        ));
    }
    Ok(())
}

fn c_string(s: &str) -> Result<CString, String> {
    CString::new(s).map_err(|_| format!("'{}' contains a NUL byte", s.escape_debug()))
}

fn c_id(id: AssetId) -> c_int {
    id.raw() as c_int
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = NativeBackend::new(dir.path().join("no_such_cooker.so"));

        let err = backend.open(&dir.path().join("cooked_assets")).err().unwrap();
        match err {
            CookError::Open { reason, .. } => assert!(reason.contains("no_such_cooker")),
            other => panic!("unexpected error: {other}"),
        }
    }

    // libc loads everywhere on glibc Linux and exports none of the cooker entry points
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_library_without_cooker_symbols_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = NativeBackend::new("libc.so.6");

        let err = backend.open(&dir.path().join("cooked_assets")).err().unwrap();
        match err {
            CookError::Open { reason, .. } => {
                assert!(reason.contains("missing symbol 'open_file'"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("cooked_assets").exists());
    }

    #[test]
    fn test_zero_status_is_success() {
        assert!(status(AssetCategory::Mesh, AssetId(1), "raccoon.glb", 0).is_ok());
    }

    #[test]
    fn test_nonzero_status_is_item_error() {
        let err = status(AssetCategory::Texture, AssetId(9), "ground_normal.png", -2).unwrap_err();
        match err {
            CookError::Item {
                category,
                id,
                file,
                reason,
            } => {
                assert_eq!(category, AssetCategory::Texture);
                assert_eq!(id, AssetId(9));
                assert_eq!(file, "ground_normal.png");
                assert_eq!(reason, "cooker returned -2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_c_string_rejects_nul() {
        assert!(c_string("raccoon.glb").is_ok());
        assert!(c_string("bad\0name").unwrap_err().contains("NUL"));
    }
}
