//! Resolution of contract names to compiled artifacts.
//!
//! Artifacts are laid out the way Hardhat writes them: for every source file
//! `contracts/Foo.sol` there is a directory `<root>/contracts/Foo.sol/`
//! holding one `<Contract>.json` per contract defined in that file, next to
//! `<Contract>.dbg.json` files that only point to build info.

use {
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
        str::FromStr,
    },
    thiserror::Error,
};

const BUILD_INFO_DIR: &str = "build-info";
const DEBUG_SUFFIX: &str = ".dbg.json";

#[derive(Debug, Error)]
pub enum Error {
    #[error("artifacts directory {0:?} does not exist")]
    MissingRoot(PathBuf),
    #[error("no artifact found for contract {0:?}")]
    NotFound(String),
    #[error("contract name {name:?} is ambiguous, use one of {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("contract {0:?} is abstract or an interface and cannot be deployed")]
    NotDeployable(String),
    #[error("contract {contract:?} needs to be linked against libraries {libraries:?}")]
    UnlinkedLibraries {
        contract: String,
        libraries: Vec<String>,
    },
    #[error("artifact {path:?} has invalid bytecode")]
    InvalidBytecode {
        path: PathBuf,
        #[source]
        source: alloy::primitives::hex::FromHexError,
    },
    #[error("could not read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse artifact {path:?}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Compiled contract that is ready to be deployed.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// On disk format of an artifact.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    // Unlinked bytecode contains `__$<hash>$__` placeholders, so it is only
    // decoded once it is known that nothing needs to be linked.
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

/// Looks up artifacts below a root directory.
#[derive(Clone, Debug)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a bare contract name (`Counter`) or a fully qualified one
    /// (`contracts/Counter.sol:Counter`) to its artifact.
    pub fn resolve(&self, name: &str) -> Result<Artifact, Error> {
        if !self.root.is_dir() {
            return Err(Error::MissingRoot(self.root.clone()));
        }
        let path = self.locate(name)?;
        tracing::debug!(?path, "found artifact");
        load(&path)
    }

    fn locate(&self, name: &str) -> Result<PathBuf, Error> {
        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self.root.join(source).join(format!("{contract}.json"));
            return match path.is_file() {
                true => Ok(path),
                false => Err(Error::NotFound(name.to_string())),
            };
        }

        let mut candidates = Vec::new();
        self.collect(&self.root, name, &mut candidates)?;
        candidates.sort();
        match candidates.len() {
            0 => Err(Error::NotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(Error::Ambiguous {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|path| self.fully_qualified_name(path, name))
                    .collect(),
            }),
        }
    }

    /// Recursively collects all files that could hold the artifact of
    /// `name`.
    fn collect(&self, dir: &Path, name: &str, found: &mut Vec<PathBuf>) -> Result<(), Error> {
        let entries = fs::read_dir(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = format!("{name}.json");
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            // Symlinked directories are not followed so that links pointing
            // back up the tree cannot make the walk loop.
            let file_type = entry.file_type().map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                if path.file_name().is_some_and(|dir| dir == BUILD_INFO_DIR) {
                    continue;
                }
                self.collect(&path, name, found)?;
            } else if is_artifact_of(&path, &file_name) {
                found.push(path);
            }
        }
        Ok(())
    }

    fn fully_qualified_name(&self, path: &Path, name: &str) -> String {
        let source = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .map(|dir| {
                dir.components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();
        format!("{source}:{name}")
    }
}

fn is_artifact_of(path: &Path, file_name: &str) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let in_source_dir = path
        .parent()
        .and_then(|dir| dir.extension())
        .is_some_and(|extension| extension == "sol");
    in_source_dir && name == file_name && !name.ends_with(DEBUG_SUFFIX)
}

fn load(path: &Path) -> Result<Artifact, Error> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawArtifact = serde_json::from_str(&contents).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    if !raw.link_references.is_empty() {
        return Err(Error::UnlinkedLibraries {
            contract: raw.contract_name,
            libraries: raw
                .link_references
                .iter()
                .flat_map(|(source, libraries)| {
                    libraries
                        .keys()
                        .map(move |library| format!("{source}:{library}"))
                })
                .collect(),
        });
    }

    let bytecode = Bytes::from_str(&raw.bytecode).map_err(|source| Error::InvalidBytecode {
        path: path.to_path_buf(),
        source,
    })?;
    if bytecode.is_empty() {
        return Err(Error::NotDeployable(raw.contract_name));
    }

    Ok(Artifact {
        contract_name: raw.contract_name,
        source_name: raw.source_name,
        abi: raw.abi,
        bytecode,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use {serde_json::json, std::path::Path};

    /// Writes an artifact for `contract` defined in `source` the way Hardhat
    /// does, including the debug file next to it.
    pub fn write_artifact(
        root: &Path,
        source: &str,
        contract: &str,
        bytecode: &str,
        abi: serde_json::Value,
    ) {
        let dir = root.join(source);
        std::fs::create_dir_all(&dir).unwrap();
        let artifact = json!({
            "_format": "hh-sol-artifact-1",
            "contractName": contract,
            "sourceName": source,
            "abi": abi,
            "bytecode": bytecode,
            "deployedBytecode": bytecode,
            "linkReferences": {},
            "deployedLinkReferences": {},
        });
        std::fs::write(
            dir.join(format!("{contract}.json")),
            serde_json::to_string_pretty(&artifact).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.join(format!("{contract}.dbg.json")),
            json!({"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/1.json"})
                .to_string(),
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{testing::write_artifact, *},
        serde_json::json,
    };

    fn registry() -> (tempfile::TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::new(dir.path());
        (dir, registry)
    }

    #[test]
    fn resolves_bare_name() {
        let (dir, registry) = registry();
        write_artifact(
            dir.path(),
            "contracts/RetrolistAttester.sol",
            "RetrolistAttester",
            "0x6080604052",
            json!([]),
        );

        let artifact = registry.resolve("RetrolistAttester").unwrap();
        assert_eq!(artifact.contract_name, "RetrolistAttester");
        assert_eq!(
            artifact.fully_qualified_name(),
            "contracts/RetrolistAttester.sol:RetrolistAttester"
        );
        assert_eq!(artifact.bytecode.as_ref(), [0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn resolves_fully_qualified_name() {
        let (dir, registry) = registry();
        write_artifact(dir.path(), "contracts/A.sol", "Token", "0x01", json!([]));
        write_artifact(dir.path(), "contracts/B.sol", "Token", "0x02", json!([]));

        let artifact = registry.resolve("contracts/B.sol:Token").unwrap();
        assert_eq!(artifact.bytecode.as_ref(), [0x02]);
    }

    #[test]
    fn ambiguous_name() {
        let (dir, registry) = registry();
        write_artifact(dir.path(), "contracts/A.sol", "Token", "0x01", json!([]));
        write_artifact(dir.path(), "contracts/B.sol", "Token", "0x02", json!([]));

        let err = registry.resolve("Token").unwrap_err();
        match err {
            Error::Ambiguous { name, candidates } => {
                assert_eq!(name, "Token");
                assert_eq!(
                    candidates,
                    ["contracts/A.sol:Token", "contracts/B.sol:Token"]
                );
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn missing_contract() {
        let (dir, registry) = registry();
        write_artifact(dir.path(), "contracts/A.sol", "Token", "0x01", json!([]));

        assert!(matches!(
            registry.resolve("RetrolistAttestor"),
            Err(Error::NotFound(name)) if name == "RetrolistAttestor"
        ));
        assert!(matches!(
            registry.resolve("contracts/B.sol:Token"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn missing_root() {
        let registry = Registry::new("/does/not/exist");
        assert!(matches!(
            registry.resolve("Token"),
            Err(Error::MissingRoot(_))
        ));
    }

    #[test]
    fn ignores_build_info_and_loose_files() {
        let (dir, registry) = registry();
        let build_info = dir.path().join("build-info/contracts/A.sol");
        std::fs::create_dir_all(&build_info).unwrap();
        std::fs::write(build_info.join("Token.json"), "{}").unwrap();
        std::fs::write(dir.path().join("Token.json"), "{}").unwrap();

        assert!(matches!(
            registry.resolve("Token"),
            Err(Error::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_directory_symlinks() {
        let (dir, registry) = registry();
        write_artifact(dir.path(), "contracts/A.sol", "Token", "0x01", json!([]));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("contracts/loop")).unwrap();

        let artifact = registry.resolve("Token").unwrap();
        assert_eq!(artifact.bytecode.as_ref(), [0x01]);
    }

    #[test]
    fn interfaces_are_not_deployable() {
        let (dir, registry) = registry();
        write_artifact(dir.path(), "contracts/IToken.sol", "IToken", "0x", json!([]));

        assert!(matches!(
            registry.resolve("IToken"),
            Err(Error::NotDeployable(_))
        ));
    }

    #[test]
    fn unlinked_libraries() {
        let (dir, registry) = registry();
        let source = dir.path().join("contracts/Uses.sol");
        std::fs::create_dir_all(&source).unwrap();
        let artifact = json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "Uses",
            "sourceName": "contracts/Uses.sol",
            "abi": [],
            "bytecode": "0x73__$f1ab7ac1f8d6ac5c3c19cd24a1d8b4d6a4$__63",
            "linkReferences": {
                "contracts/Math.sol": {
                    "Math": [{ "length": 20, "start": 1 }]
                }
            },
        });
        std::fs::write(source.join("Uses.json"), artifact.to_string()).unwrap();

        match registry.resolve("Uses").unwrap_err() {
            Error::UnlinkedLibraries { contract, libraries } => {
                assert_eq!(contract, "Uses");
                assert_eq!(libraries, ["contracts/Math.sol:Math"]);
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn malformed_artifact() {
        let (dir, registry) = registry();
        let source = dir.path().join("contracts/Broken.sol");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("Broken.json"), "not json").unwrap();

        assert!(matches!(
            registry.resolve("Broken"),
            Err(Error::Malformed { .. })
        ));
    }
}
