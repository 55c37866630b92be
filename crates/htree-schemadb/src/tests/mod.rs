// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

mod db_test;
