use std::{fs, path::PathBuf};

fn test_temp_dir_path(tag: &str) -> PathBuf {
    let tmpdir = std::env::temp_dir();

    let make_dir_path = |val: u32| {
        let dname = format!("holdings-pivot-test-{}-{}", tag, val);
        tmpdir.join(dname)
    };

    for val in 1..1000000 {
        let path = make_dir_path(val);
        if !path.exists() {
            return path;
        }
    }
    panic!("Could not create temp directory path that does not already exist");
}

/// A unique scratch directory, created on construction and removed on drop.
pub struct TestDir {
    pub path: PathBuf,
}

impl TestDir {
    pub fn new(tag: &str) -> TestDir {
        let path = test_temp_dir_path(tag);
        fs::create_dir_all(&path).unwrap();
        TestDir { path }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}
