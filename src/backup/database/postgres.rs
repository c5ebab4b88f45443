use crate::backup::database::{DumpCommand, DumpCommandProvider};
use crate::backup::definition::PostgresDefinition;

pub static PG_DUMP_PROGRAM: &str = "pg_dump";
pub static PG_DUMPALL_PROGRAM: &str = "pg_dumpall";
pub static PASSWORD_ENV: &str = "PGPASSWORD";

impl DumpCommandProvider for PostgresDefinition {
    /// `pg_dump` for a named database, `pg_dumpall` for the whole cluster.
    ///
    /// A password travels through `PGPASSWORD`.
    fn construct_dump_command(&self) -> DumpCommand {
        let mut args = vec![
            "-h".to_string(),
            self.host.clone(),
            "-U".to_string(),
            self.user.clone(),
            "-p".to_string(),
            self.port.to_string(),
        ];

        let program = match self.database.as_deref().filter(|db| !db.is_empty()) {
            Some(database) => {
                args.push(database.to_string());
                PG_DUMP_PROGRAM
            }
            None => PG_DUMPALL_PROGRAM,
        };

        let command = DumpCommand::new(program, args);
        if self.password.is_empty() {
            command
        } else {
            command.with_env(PASSWORD_ENV, self.password.clone())
        }
    }
}
