mod mutator_test;
mod tree_test;

fn test_config(dir: &tempfile::TempDir) -> crate::Config {
    crate::Config::with_path_prefix(dir.path())
}
