use crate::backup::database::{DumpCommand, DumpCommandProvider};
use crate::backup::definition::MysqlDefinition;

pub static MYSQL_DUMP_PROGRAM: &str = "mysqldump";

impl DumpCommandProvider for MysqlDefinition {
    /// `mysqldump -h <host> -u <user> -P <port> [--password=<pw>] (<db> | --all-databases)`
    ///
    /// The password ends up on the command line and is visible to anyone who
    /// can list processes on the machine running the dump.
    fn construct_dump_command(&self) -> DumpCommand {
        let mut args = vec![
            "-h".to_string(),
            self.host.clone(),
            "-u".to_string(),
            self.user.clone(),
            "-P".to_string(),
            self.port.to_string(),
        ];

        if !self.password.is_empty() {
            args.push(format!("--password={}", self.password.inner()));
        }

        match self.database.as_deref().filter(|db| !db.is_empty()) {
            Some(database) => args.push(database.to_string()),
            None => args.push("--all-databases".to_string()),
        }

        DumpCommand::new(MYSQL_DUMP_PROGRAM, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> MysqlDefinition {
        MysqlDefinition {
            host: "localhost".into(),
            port: 5432,
            user: "wordpress".into(),
            password: "wordpress".into(),
            database: None,
        }
    }

    #[test]
    fn test_all_databases() {
        let command = definition().construct_dump_command();
        assert_eq!(command.program, "mysqldump");
        assert_eq!(
            command.args,
            vec![
                "-h",
                "localhost",
                "-u",
                "wordpress",
                "-P",
                "5432",
                "--password=wordpress",
                "--all-databases",
            ]
        );
        assert!(command.env.is_empty());
    }

    #[test]
    fn test_single_database() {
        let command = MysqlDefinition {
            database: Some("wp".into()),
            ..definition()
        }
        .construct_dump_command();
        assert_eq!(command.args.last().map(String::as_str), Some("wp"));
        assert!(!command.args.contains(&"--all-databases".to_string()));
    }

    #[test]
    fn test_empty_database_name_dumps_everything() {
        let command = MysqlDefinition {
            database: Some(String::new()),
            ..definition()
        }
        .construct_dump_command();
        assert_eq!(command.args.last().map(String::as_str), Some("--all-databases"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            definition().construct_dump_command(),
            definition().construct_dump_command()
        );
    }
}
