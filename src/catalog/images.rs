use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

/// Releases the backing resource of a product image reference.
pub trait ImageStore: Send + Sync {
    /// Frees the resource behind `image`. The shared placeholder is never released.
    fn release(&self, image: &str) -> io::Result<()>;
}

/// Images kept as files on local disk next to a shared placeholder.
pub struct FsImageStore {
    placeholder: PathBuf,
}

impl FsImageStore {
    pub fn new(placeholder: impl Into<PathBuf>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    fn is_placeholder(&self, image: &Path) -> bool {
        image == self.placeholder
    }
}

impl ImageStore for FsImageStore {
    #[instrument(skip(self))]
    fn release(&self, image: &str) -> io::Result<()> {
        let path = Path::new(image);
        if self.is_placeholder(path) {
            debug!("Placeholder image kept");
            return Ok(());
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Image file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
