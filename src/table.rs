//! Substitution tables
//!
//! A table maps placeholder names to the text blocks that replace them. The
//! built-in table carries the Chapel apt packaging blocks; other tables can be
//! loaded from TOML so that a template can be filled for a different target
//! without recompiling.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::template::lexer::is_identifier;

/// Errors that can occur when loading or parsing substitution tables
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read substitution table file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse substitution table TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid placeholder name '{0}' (expected letters, digits and underscores, not starting with a digit)")]
    InvalidKey(String),
}

/// Mapping from placeholder name to replacement text
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    /// Optional name for the table
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    entries: HashMap<String, String>,
}

/// TOML structure for deserializing tables
#[derive(Deserialize)]
struct TomlTable {
    metadata: Option<TomlMetadata>,
    substitutions: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Chapel apt packaging blocks.
///
/// Every value starts and ends with a newline. `$VARS` are Docker build
/// arguments and stay unexpanded.
const CHAPEL_APT_TABLE: &str = r##"
[metadata]
name = "chapel-apt"
description = "Dockerfile blocks for building Chapel .deb packages"

[substitutions]
ARGUMENTS = '''

ARG BASENAME=chapel
ARG CHAPEL_VERSION=2.0.0
ARG PACKAGE_VERSION=1
ARG OS_NAME
ARG DOCKER_DIR_NAME
ARG PARALLEL=1
ARG TARGETARCH
'''

USER_CREATION = '''

RUN useradd -ms /bin/bash user && \
    usermod -aG sudo user && \
    echo "user:password" | chpasswd
USER user
WORKDIR /home/user
'''

GET_CHAPEL = '''

COPY --chown=user ./tarballs/chapel-$CHAPEL_VERSION.tar.gz /home/user/chapel-$CHAPEL_VERSION.tar.gz
RUN tar xf chapel-$CHAPEL_VERSION.tar.gz
'''

BUILD_DEFAULT = '''

WORKDIR /home/user/chapel-$CHAPEL_VERSION
RUN export CHPL_HOME=/home/user/chapel-$CHAPEL_VERSION && \
    rm -f $CHPL_HOME/chplconfig && touch $CHPL_HOME/chplconfig && \
    ./configure --prefix=/usr && \
    nice make all chpldoc mason chplcheck chpl-language-server -j$PARALLEL && \
    unset CHPL_HOME
'''

BUILD_GASNET_UDP = '''

RUN export CHPL_HOME=/home/user/chapel-$CHAPEL_VERSION && \
    rm -f $CHPL_HOME/chplconfig && touch $CHPL_HOME/chplconfig && \
    echo "CHPL_COMM=gasnet" >> $CHPL_HOME/chplconfig && \
    ./configure --prefix=/usr && \
    nice make all chpldoc mason chplcheck chpl-language-server -j$PARALLEL && \
    unset CHPL_HOME
'''

# TODO: drop CHPL_COMM_OFI_OOB=pmi2 once chapel-lang/chapel#25236 is resolved
BUILD_OFI_SLURM = '''

RUN export CHPL_HOME=/home/user/chapel-$CHAPEL_VERSION && \
    export CHPL_COMM_OFI_OOB=pmi2 && \
    rm -f $CHPL_HOME/chplconfig && touch $CHPL_HOME/chplconfig && \
    echo "CHPL_COMM=ofi" >> $CHPL_HOME/chplconfig && \
    echo "CHPL_LAUNCHER=slurm-srun" >> $CHPL_HOME/chplconfig && \
    echo "CHPL_COMM_OFI_OOB=pmi2" >> $CHPL_HOME/chplconfig && \
    echo "CHPL_LIBFABRIC=bundled" >> $CHPL_HOME/chplconfig && \
    ./configure --prefix=/usr && \
    nice make all chpldoc mason chplcheck chpl-language-server -j$PARALLEL && \
    unset CHPL_HOME && unset CHPL_COMM_OFI_OOB
'''

INSTALL = '''

USER root
RUN make install
USER user
'''

PACKAGE_SETUP = '''

WORKDIR /home/user

COPY --chown=user ./apt/$DOCKER_DIR_NAME/control.template /home/user/control.template
COPY --chown=user ./apt/common/make_dirs.py /home/user/make_dirs.py
COPY --chown=user ./common/package_name.py /home/user/package_name.py
RUN python3 make_dirs.py $BASENAME $CHAPEL_VERSION $PACKAGE_VERSION $OS_NAME $TARGETARCH

COPY --chown=user ./common/fixpaths.py /home/user/fixpaths.py
USER root
RUN python3 fixpaths.py $BASENAME $CHAPEL_VERSION $PACKAGE_VERSION $OS_NAME $TARGETARCH
USER user

COPY --chown=user ./apt/common/copy_files.py /home/user/copy_files.py
RUN python3 copy_files.py $BASENAME $CHAPEL_VERSION $PACKAGE_VERSION $OS_NAME $TARGETARCH
'''

PACKAGE_BUILD = '''

WORKDIR /home/user
RUN dpkg-deb --build $(python3 package_name.py $BASENAME $CHAPEL_VERSION $PACKAGE_VERSION $OS_NAME $TARGETARCH)

FROM scratch as artifact
COPY --from=build /home/user/*.deb /

FROM build as release
'''
"##;

impl SubstitutionTable {
    /// The built-in Chapel apt packaging table
    pub fn chapel_apt() -> Self {
        Self::from_str(CHAPEL_APT_TABLE).expect("Built-in substitution table should be valid TOML")
    }

    /// Build a table from name/value pairs
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Result<Self, TableError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<HashMap<_, _>>();
        Self::validated(None, None, entries)
    }

    /// Load a table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a table from a TOML string
    pub fn from_str(content: &str) -> Result<Self, TableError> {
        let parsed: TomlTable = toml::from_str(content)?;
        let (name, description) = match parsed.metadata {
            Some(m) => (m.name, m.description),
            None => (None, None),
        };
        Self::validated(name, description, parsed.substitutions)
    }

    fn validated(
        name: Option<String>,
        description: Option<String>,
        entries: HashMap<String, String>,
    ) -> Result<Self, TableError> {
        if let Some(bad) = entries.keys().find(|k| !is_identifier(k)) {
            return Err(TableError::InvalidKey(bad.clone()));
        }
        Ok(Self {
            name,
            description,
            entries,
        })
    }

    /// Replacement text for a placeholder
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Placeholder names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table keys that look like a misspelling of `name`
    ///
    /// Matches are case-insensitive equality or containment in either
    /// direction.
    pub fn suggestions(&self, name: &str) -> Vec<String> {
        let wanted = name.to_ascii_uppercase();
        let mut found: Vec<String> = self
            .entries
            .keys()
            .filter(|key| {
                let key = key.to_ascii_uppercase();
                key == wanted || key.contains(&wanted) || wanted.contains(&key)
            })
            .cloned()
            .collect();
        found.sort_unstable();
        found
    }
}
