use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(upcycle_home: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(base) = upcycle_home {
        return Some(base.join(".env"));
    }
    Some(home_dir?.join(".upcycle/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("UPCYCLE_HOME").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn upcycle_home_holds_the_env_file() {
        let got = fallback_dotenv_path(
            Some(PathBuf::from("/srv/upcycle")),
            Some(PathBuf::from("/home/alice")),
        );
        assert_eq!(got, Some(PathBuf::from("/srv/upcycle/.env")));
    }

    #[test]
    fn home_dir_is_used_when_upcycle_home_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice")));
        assert_eq!(got, Some(PathBuf::from("/home/alice/.upcycle/.env")));
    }

    #[test]
    fn no_base_means_no_fallback() {
        assert_eq!(fallback_dotenv_path(None, None), None);
    }
}
