//! Production oracle backed by the exchange's wasm module
//!
//! Loads the opaque module from disk at session construction and binds its
//! five exports as typed functions. Any load or binding failure is fatal:
//! without the oracle no token can ever be descrambled.

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use wasmtime::{Engine, Instance, Module, Store, TypedFunc};

use super::{OracleEntry, SaltOracle};
use crate::error::{Error, Result};

type EntryFunc = TypedFunc<(i32, i32, i32, i32, i32), i32>;

/// [`SaltOracle`] implementation executing the exchange's opaque module.
///
/// The wasmtime store is single-threaded by contract, so calls serialize
/// through a mutex. Entry points are tiny pure functions; contention is not
/// a concern at the request rates a scraping session produces.
pub struct WasmOracle {
    store: Mutex<Store<()>>,
    cdx: EntryFunc,
    rdx: EntryFunc,
    bdx: EntryFunc,
    ndx: EntryFunc,
    mdx: EntryFunc,
}

impl WasmOracle {
    /// Load the token-index module from `path` and bind its entry points.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let engine = Engine::default();
        let module = Module::from_file(&engine, path).map_err(|e| {
            Error::oracle_binding(format!(
                "failed to load token-index module from '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut store = Store::new(&engine, ());
        // The module is self-contained; it imports nothing.
        let instance = Instance::new(&mut store, &module, &[]).map_err(|e| {
            Error::oracle_binding(format!("failed to instantiate token-index module: {}", e))
        })?;

        let oracle = Self {
            cdx: Self::bind(&instance, &mut store, OracleEntry::Cdx)?,
            rdx: Self::bind(&instance, &mut store, OracleEntry::Rdx)?,
            bdx: Self::bind(&instance, &mut store, OracleEntry::Bdx)?,
            ndx: Self::bind(&instance, &mut store, OracleEntry::Ndx)?,
            mdx: Self::bind(&instance, &mut store, OracleEntry::Mdx)?,
            store: Mutex::new(store),
        };

        tracing::debug!(module = %path.display(), "token-index oracle bound");
        Ok(oracle)
    }

    fn bind(instance: &Instance, store: &mut Store<()>, entry: OracleEntry) -> Result<EntryFunc> {
        let name = entry.export_name();
        instance
            .get_typed_func::<(i32, i32, i32, i32, i32), i32>(&mut *store, name)
            .map_err(|e| {
                Error::oracle_binding(format!("missing or mistyped export '{}': {}", name, e))
            })
    }
}

impl SaltOracle for WasmOracle {
    fn cut_index(&self, entry: OracleEntry, args: [i32; 5]) -> Result<i32> {
        let func = match entry {
            OracleEntry::Cdx => &self.cdx,
            OracleEntry::Rdx => &self.rdx,
            OracleEntry::Bdx => &self.bdx,
            OracleEntry::Ndx => &self.ndx,
            OracleEntry::Mdx => &self.mdx,
        };

        let mut store = self
            .store
            .lock()
            .map_err(|_| Error::oracle("oracle store lock poisoned"))?;

        let [a, b, c, d, e] = args;
        func.call(&mut *store, (a, b, c, d, e))
            .map_err(|e| Error::oracle(format!("'{}' trapped: {}", entry.export_name(), e)))
    }
}

impl fmt::Debug for WasmOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WasmOracle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Identity-style module: each entry point returns one of its arguments,
    /// which makes dispatch and argument order observable.
    const PASSTHROUGH_WAT: &str = r#"
        (module
          (func (export "cdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 0))
          (func (export "rdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 1))
          (func (export "bdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 2))
          (func (export "ndx") (param i32 i32 i32 i32 i32) (result i32) (local.get 3))
          (func (export "mdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 4)))
    "#;

    fn module_file(wat: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(wat.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_binds_and_dispatches_entries() {
        let file = module_file(PASSTHROUGH_WAT);
        let oracle = WasmOracle::from_file(file.path()).unwrap();

        let args = [11, 22, 33, 44, 55];
        assert_eq!(oracle.cut_index(OracleEntry::Cdx, args).unwrap(), 11);
        assert_eq!(oracle.cut_index(OracleEntry::Rdx, args).unwrap(), 22);
        assert_eq!(oracle.cut_index(OracleEntry::Bdx, args).unwrap(), 33);
        assert_eq!(oracle.cut_index(OracleEntry::Ndx, args).unwrap(), 44);
        assert_eq!(oracle.cut_index(OracleEntry::Mdx, args).unwrap(), 55);
    }

    #[test]
    fn test_missing_module_is_binding_error() {
        let err = WasmOracle::from_file("/nonexistent/nepse.wasm").unwrap_err();
        assert!(matches!(err, Error::OracleBinding(_)));
        assert!(err.to_string().contains("nepse.wasm"));
    }

    #[test]
    fn test_missing_export_is_binding_error() {
        let wat = r#"
            (module
              (func (export "cdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 0)))
        "#;
        let file = module_file(wat);

        let err = WasmOracle::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::OracleBinding(_)));
        assert!(err.to_string().contains("rdx"));
    }

    #[test]
    fn test_mistyped_export_is_binding_error() {
        let wat = r#"
            (module
              (func (export "cdx") (param i32 i32) (result i32) (local.get 0))
              (func (export "rdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 1))
              (func (export "bdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 2))
              (func (export "ndx") (param i32 i32 i32 i32 i32) (result i32) (local.get 3))
              (func (export "mdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 4)))
        "#;
        let file = module_file(wat);

        let err = WasmOracle::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::OracleBinding(_)));
        assert!(err.to_string().contains("cdx"));
    }

    #[test]
    fn test_trapping_entry_is_call_error() {
        let wat = r#"
            (module
              (func (export "cdx") (param i32 i32 i32 i32 i32) (result i32) unreachable)
              (func (export "rdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 1))
              (func (export "bdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 2))
              (func (export "ndx") (param i32 i32 i32 i32 i32) (result i32) (local.get 3))
              (func (export "mdx") (param i32 i32 i32 i32 i32) (result i32) (local.get 4)))
        "#;
        let file = module_file(wat);
        let oracle = WasmOracle::from_file(file.path()).unwrap();

        let err = oracle
            .cut_index(OracleEntry::Cdx, [1, 2, 3, 4, 5])
            .unwrap_err();
        assert!(matches!(err, Error::Oracle(_)));
        assert!(err.to_string().contains("cdx"));
    }
}
