// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! Programmatic configuration for a tree. spec.md §6.4: a filesystem path
//! prefix and nothing else — no environment variables, no CLI surface.

use rocksdb::{BlockBasedOptions, Cache, Options};
use std::path::PathBuf;

pub const DEFAULT_PATH_PREFIX: &str = "merkleTree/";

#[derive(Clone, Debug)]
pub struct Config {
    pub path_prefix: PathBuf,
    pub block_cache_bytes: usize,
    pub write_buffer_bytes: usize,
    pub max_background_jobs: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_prefix: PathBuf::from(DEFAULT_PATH_PREFIX),
            block_cache_bytes: 64 * 1024 * 1024,
            write_buffer_bytes: 32 * 1024 * 1024,
            max_background_jobs: 2,
        }
    }
}

impl Config {
    pub fn with_path_prefix(path_prefix: impl Into<PathBuf>) -> Self {
        Self { path_prefix: path_prefix.into(), ..Self::default() }
    }

    pub fn tree_path(&self, name: &str) -> PathBuf {
        self.path_prefix.join(name)
    }

    pub fn rocksdb_options(&self) -> Options {
        let mut opts = Options::default();
        opts.set_max_background_jobs(self.max_background_jobs);
        opts.set_write_buffer_size(self.write_buffer_bytes);

        let cache = Cache::new_lru_cache(self.block_cache_bytes);
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        opts.set_block_based_table_factory(&block_opts);

        opts
    }
}
