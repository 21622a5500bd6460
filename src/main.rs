use anyhow::Result;

fn main() -> Result<()> {
    sms_backup_explorer::cli::run()
}
