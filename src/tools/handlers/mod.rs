// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Built-in tool handlers.

mod bash;
mod read_file;
mod write_file;

pub use bash::BashTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;
