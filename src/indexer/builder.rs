use std::path::Path;

use anyhow::Result;

use crate::indexer::index::ConversationIndex;
use crate::parsers::parse_backup_file;

/// Parse a backup export and build the conversation index.
///
/// One shot: the whole document is parsed before any query is possible.
/// On success the returned index is complete and frozen; on any fatal parse
/// error no index is returned at all.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use sms_backup_explorer::build_index;
///
/// let index = build_index(Path::new("sms-20200412.xml"))?;
/// println!("Indexed {} messages", index.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_index(path: &Path) -> Result<ConversationIndex> {
    let messages = parse_backup_file(path)?;

    let mut index = ConversationIndex::new();
    for message in messages {
        index.insert(message);
    }
    index.finalize();

    eprintln!(
        "Indexed {} messages across {} conversations",
        index.len(),
        index.contacts().len()
    );

    Ok(index)
}
