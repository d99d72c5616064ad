use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A table in the structured-data store holding one record kind.
pub trait Table: Serialize + DeserializeOwned + Send + Sync {
    const NAME: &'static str;
}

/// Forms only ever write the three known values. Rows read back with any
/// other status keep the raw string in `Other` so one odd row can't hide the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Pass,
    Fail,
    #[default]
    NotTested,
    Other(String),
}

impl TestStatus {
    pub const ALL: [TestStatus; 3] = [TestStatus::Pass, TestStatus::Fail, TestStatus::NotTested];

    pub fn as_str(&self) -> &str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::NotTested => "not-tested",
            TestStatus::Other(raw) => raw,
        }
    }

    /// Exact wire value; anything unrecognised is kept verbatim.
    pub fn from_wire(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match raw.as_str() {
            "pass" => TestStatus::Pass,
            "fail" => TestStatus::Fail,
            "not-tested" => TestStatus::NotTested,
            _ => TestStatus::Other(raw),
        }
    }
}

impl Serialize for TestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TestStatus::from_wire)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "p" => Ok(TestStatus::Pass),
            "fail" | "f" => Ok(TestStatus::Fail),
            "not-tested" | "n/t" | "nt" | "n" => Ok(TestStatus::NotTested),
            other => Err(format!("Unknown test status: {}", other)),
        }
    }
}

/// Outcome of one tested feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub notes: String,
}

impl TestResult {
    pub fn new(status: TestStatus, notes: impl Into<String>) -> Self {
        Self {
            status,
            notes: notes.into(),
        }
    }

    pub fn with_status(status: TestStatus) -> Self {
        Self::new(status, "")
    }

    /// True while the tester has neither picked a status nor written notes.
    pub fn is_default(&self) -> bool {
        self.status == TestStatus::NotTested && self.notes.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardType {
    #[default]
    #[serde(rename = "")]
    Unset,
    Only,
    Full,
}

impl LeaderboardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardType::Unset => "",
            LeaderboardType::Only => "only",
            LeaderboardType::Full => "full",
        }
    }
}

impl FromStr for LeaderboardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(LeaderboardType::Unset),
            "only" => Ok(LeaderboardType::Only),
            "full" => Ok(LeaderboardType::Full),
            other => Err(format!("Unknown leaderboard type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResult {
    #[serde(flatten)]
    pub result: TestResult,
    #[serde(rename = "type", default)]
    pub kind: LeaderboardType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTests {
    #[serde(default)]
    pub register: TestResult,
    #[serde(default)]
    pub login: TestResult,
    #[serde(default)]
    pub forgot_password: TestResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainSectionTests {
    #[serde(default)]
    pub produksi: TestResult,
    #[serde(default)]
    pub konsumsi: TestResult,
    #[serde(default)]
    pub menangah: TestResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideMissionTests {
    #[serde(default)]
    pub misi_pilah_sampah: TestResult,
    #[serde(default)]
    pub ikut_aksi: TestResult,
}

/// The fixed set of features on the full-app QA form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestItem {
    Register,
    Login,
    ForgotPassword,
    Produksi,
    Konsumsi,
    Menangah,
    MisiPilahSampah,
    IkutAksi,
    FoodPrint,
    Leaderboard,
    Toko,
    Komunitas,
    HasilUser,
    Sertifikat,
    UserProfile,
}

impl TestItem {
    pub const ALL: [TestItem; 15] = [
        TestItem::Register,
        TestItem::Login,
        TestItem::ForgotPassword,
        TestItem::Produksi,
        TestItem::Konsumsi,
        TestItem::Menangah,
        TestItem::MisiPilahSampah,
        TestItem::IkutAksi,
        TestItem::FoodPrint,
        TestItem::Leaderboard,
        TestItem::Toko,
        TestItem::Komunitas,
        TestItem::HasilUser,
        TestItem::Sertifikat,
        TestItem::UserProfile,
    ];

    /// Label shown next to the pass/fail buttons.
    pub fn label(&self) -> &'static str {
        match self {
            TestItem::Register => "User Registration",
            TestItem::Login => "User Login",
            TestItem::ForgotPassword => "Forgot Password",
            TestItem::Produksi => "Produksi",
            TestItem::Konsumsi => "Konsumsi",
            TestItem::Menangah => "Menangah",
            TestItem::MisiPilahSampah => "Misi Pilah Sampah",
            TestItem::IkutAksi => "Ikut Aksi",
            TestItem::FoodPrint => "FoodPrint Feature",
            TestItem::Leaderboard => "Leaderboard Display",
            TestItem::Toko => "Listing All Data → Purchase Items",
            TestItem::Komunitas => "Render Properly",
            TestItem::HasilUser => "Edit Avatar",
            TestItem::Sertifikat => "Sertifikat Unlock All Missions",
            TestItem::UserProfile => "Edit User Profile",
        }
    }

    /// Card title the item is grouped under.
    pub fn group(&self) -> &'static str {
        match self {
            TestItem::Register | TestItem::Login | TestItem::ForgotPassword => "Authentication",
            TestItem::Produksi | TestItem::Konsumsi | TestItem::Menangah => "Main Section",
            TestItem::MisiPilahSampah | TestItem::IkutAksi => "Side Mission",
            TestItem::FoodPrint => "FoodPrint",
            TestItem::Leaderboard => "Leaderboard",
            TestItem::Toko => "Toko (Store)",
            TestItem::Komunitas => "Komunitas",
            TestItem::HasilUser => "Hasil User",
            TestItem::Sertifikat => "Sertifikat",
            TestItem::UserProfile => "User Profile",
        }
    }

    /// Key used in input files and in the nested JSON groups.
    pub fn key(&self) -> &'static str {
        match self {
            TestItem::Register => "register",
            TestItem::Login => "login",
            TestItem::ForgotPassword => "forgotPassword",
            TestItem::Produksi => "produksi",
            TestItem::Konsumsi => "konsumsi",
            TestItem::Menangah => "menangah",
            TestItem::MisiPilahSampah => "misiPilahSampah",
            TestItem::IkutAksi => "ikutAksi",
            TestItem::FoodPrint => "foodPrint",
            TestItem::Leaderboard => "leaderboard",
            TestItem::Toko => "toko",
            TestItem::Komunitas => "komunitas",
            TestItem::HasilUser => "hasilUser",
            TestItem::Sertifikat => "sertifikat",
            TestItem::UserProfile => "userProfile",
        }
    }
}

impl FromStr for TestItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestItem::ALL
            .into_iter()
            .find(|item| item.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown test item: {}", s))
    }
}

/// Primary key as returned by the store; accepts uuid strings and serial integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RecordId(s),
            RawId::Number(n) => RecordId(n.to_string()),
        })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One full-app QA submission (row of `qa_test_reports`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaTestReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub tester_name: String,
    pub test_date: NaiveDate,
    pub application_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_environment: Option<String>,
    #[serde(default)]
    pub auth_tests: AuthTests,
    #[serde(default)]
    pub main_section_tests: MainSectionTests,
    #[serde(default)]
    pub side_mission_tests: SideMissionTests,
    // Rows from the older form have no food print column value.
    #[serde(default)]
    pub food_print_tests: TestResult,
    #[serde(default)]
    pub leaderboard: LeaderboardResult,
    #[serde(default)]
    pub toko: TestResult,
    #[serde(default)]
    pub komunitas: TestResult,
    #[serde(default)]
    pub hasil_user: TestResult,
    #[serde(default)]
    pub sertifikat: TestResult,
    #[serde(default)]
    pub user_profile: TestResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Table for QaTestReport {
    const NAME: &'static str = "qa_test_reports";
}

impl QaTestReport {
    pub fn new(
        tester_name: impl Into<String>,
        test_date: NaiveDate,
        application_version: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            tester_name: tester_name.into(),
            test_date,
            application_version: application_version.into(),
            test_environment: None,
            auth_tests: AuthTests::default(),
            main_section_tests: MainSectionTests::default(),
            side_mission_tests: SideMissionTests::default(),
            food_print_tests: TestResult::default(),
            leaderboard: LeaderboardResult::default(),
            toko: TestResult::default(),
            komunitas: TestResult::default(),
            hasil_user: TestResult::default(),
            sertifikat: TestResult::default(),
            user_profile: TestResult::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn result(&self, item: TestItem) -> &TestResult {
        match item {
            TestItem::Register => &self.auth_tests.register,
            TestItem::Login => &self.auth_tests.login,
            TestItem::ForgotPassword => &self.auth_tests.forgot_password,
            TestItem::Produksi => &self.main_section_tests.produksi,
            TestItem::Konsumsi => &self.main_section_tests.konsumsi,
            TestItem::Menangah => &self.main_section_tests.menangah,
            TestItem::MisiPilahSampah => &self.side_mission_tests.misi_pilah_sampah,
            TestItem::IkutAksi => &self.side_mission_tests.ikut_aksi,
            TestItem::FoodPrint => &self.food_print_tests,
            TestItem::Leaderboard => &self.leaderboard.result,
            TestItem::Toko => &self.toko,
            TestItem::Komunitas => &self.komunitas,
            TestItem::HasilUser => &self.hasil_user,
            TestItem::Sertifikat => &self.sertifikat,
            TestItem::UserProfile => &self.user_profile,
        }
    }

    pub fn result_mut(&mut self, item: TestItem) -> &mut TestResult {
        match item {
            TestItem::Register => &mut self.auth_tests.register,
            TestItem::Login => &mut self.auth_tests.login,
            TestItem::ForgotPassword => &mut self.auth_tests.forgot_password,
            TestItem::Produksi => &mut self.main_section_tests.produksi,
            TestItem::Konsumsi => &mut self.main_section_tests.konsumsi,
            TestItem::Menangah => &mut self.main_section_tests.menangah,
            TestItem::MisiPilahSampah => &mut self.side_mission_tests.misi_pilah_sampah,
            TestItem::IkutAksi => &mut self.side_mission_tests.ikut_aksi,
            TestItem::FoodPrint => &mut self.food_print_tests,
            TestItem::Leaderboard => &mut self.leaderboard.result,
            TestItem::Toko => &mut self.toko,
            TestItem::Komunitas => &mut self.komunitas,
            TestItem::HasilUser => &mut self.hasil_user,
            TestItem::Sertifikat => &mut self.sertifikat,
            TestItem::UserProfile => &mut self.user_profile,
        }
    }

    /// Every TestResult-shaped field, flattened in form order.
    pub fn results(&self) -> impl Iterator<Item = (TestItem, &TestResult)> + '_ {
        TestItem::ALL.into_iter().map(move |item| (item, self.result(item)))
    }
}

/// The predefined checklist sections of an internal testing case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaseSection {
    #[serde(rename = "Homepage")]
    Homepage,
    #[serde(rename = "Riwayat Catatan")]
    RiwayatCatatan,
    #[serde(rename = "Tambah Catatan (flow)")]
    TambahCatatanFlow,
    #[serde(rename = "Tambah Catatan (Streak)")]
    TambahCatatanStreak,
    #[serde(rename = "Streak page")]
    StreakPage,
    #[serde(rename = "Footprint INFO popup")]
    FootprintInfoPopup,
    #[serde(rename = "Cache emptying scenario")]
    CacheEmptying,
    #[serde(rename = "Logout/Login scenario")]
    LogoutLogin,
    #[serde(rename = "Uninstall scenario")]
    Uninstall,
}

impl CaseSection {
    pub const ALL: [CaseSection; 9] = [
        CaseSection::Homepage,
        CaseSection::RiwayatCatatan,
        CaseSection::TambahCatatanFlow,
        CaseSection::TambahCatatanStreak,
        CaseSection::StreakPage,
        CaseSection::FootprintInfoPopup,
        CaseSection::CacheEmptying,
        CaseSection::LogoutLogin,
        CaseSection::Uninstall,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            CaseSection::Homepage => "Homepage",
            CaseSection::RiwayatCatatan => "Riwayat Catatan",
            CaseSection::TambahCatatanFlow => "Tambah Catatan (flow)",
            CaseSection::TambahCatatanStreak => "Tambah Catatan (Streak)",
            CaseSection::StreakPage => "Streak page",
            CaseSection::FootprintInfoPopup => "Footprint INFO popup",
            CaseSection::CacheEmptying => "Cache emptying scenario",
            CaseSection::LogoutLogin => "Logout/Login scenario",
            CaseSection::Uninstall => "Uninstall scenario",
        }
    }
}

impl fmt::Display for CaseSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for CaseSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseSection::ALL
            .into_iter()
            .find(|section| section.title().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}

/// Persisted shape of one section; the screenshot is already a public URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(rename = "textFeedback", default)]
    pub text_feedback: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub status: TestStatus,
}

/// One internal testing submission (row of `internal_testing_cases`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalTestingCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub test_name: String,
    #[serde(default)]
    pub sections: BTreeMap<CaseSection, SectionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Table for InternalTestingCase {
    const NAME: &'static str = "internal_testing_cases";
}

impl InternalTestingCase {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            id: None,
            test_name: test_name.into(),
            sections: BTreeMap::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_value(TestStatus::Pass).unwrap(), json!("pass"));
        assert_eq!(serde_json::to_value(TestStatus::Fail).unwrap(), json!("fail"));
        assert_eq!(
            serde_json::to_value(TestStatus::NotTested).unwrap(),
            json!("not-tested")
        );
        assert_eq!(TestStatus::default(), TestStatus::NotTested);
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let status: TestStatus = serde_json::from_value(json!("blocked")).unwrap();
        assert_eq!(status, TestStatus::Other("blocked".to_string()));
        assert_eq!(status.as_str(), "blocked");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("blocked"));

        // Aliases are for typed input only, not for stored rows.
        assert_eq!(
            serde_json::from_value::<TestStatus>(json!("p")).unwrap(),
            TestStatus::Other("p".to_string())
        );
        assert!("blocked".parse::<TestStatus>().is_err());
    }

    #[test]
    fn test_result_default_detection() {
        assert!(TestResult::default().is_default());
        assert!(TestResult::new(TestStatus::NotTested, "   ").is_default());
        assert!(!TestResult::new(TestStatus::NotTested, "crashed").is_default());
        assert!(!TestResult::with_status(TestStatus::Fail).is_default());
    }

    #[test]
    fn test_report_payload_shape() {
        let mut report = QaTestReport::new(
            "Alice",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "v1.0.0",
        );
        report.auth_tests.register = TestResult::with_status(TestStatus::Pass);
        report.leaderboard.kind = LeaderboardType::Full;

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
        assert!(value.get("test_environment").is_none());
        assert_eq!(value["test_date"], "2024-01-01");
        assert_eq!(value["auth_tests"]["register"]["status"], "pass");
        assert_eq!(value["auth_tests"]["forgotPassword"]["status"], "not-tested");
        assert_eq!(value["side_mission_tests"]["misiPilahSampah"]["notes"], "");
        assert_eq!(
            value["leaderboard"],
            json!({"status": "not-tested", "notes": "", "type": "full"})
        );
    }

    #[test]
    fn test_older_rows_without_food_print() {
        let row = json!({
            "id": 42,
            "tester_name": "Budi",
            "test_date": "2024-03-05",
            "application_version": "v2.7.8",
            "test_environment": "staging",
            "auth_tests": {"register": {"status": "fail", "notes": "500"}},
            "main_section_tests": {},
            "side_mission_tests": {},
            "leaderboard": {"status": "pass", "notes": "", "type": ""},
            "toko": {"status": "pass", "notes": ""},
            "komunitas": {"status": "pass", "notes": ""},
            "hasil_user": {"status": "pass", "notes": ""},
            "sertifikat": {"status": "pass", "notes": ""},
            "user_profile": {"status": "pass", "notes": ""},
            "created_at": "2024-03-05T10:00:00.123456+00:00"
        });

        let report: QaTestReport = serde_json::from_value(row).unwrap();
        assert_eq!(report.id, Some(RecordId("42".to_string())));
        assert_eq!(report.test_environment.as_deref(), Some("staging"));
        assert_eq!(report.food_print_tests, TestResult::default());
        assert_eq!(report.auth_tests.register.notes, "500");
        assert_eq!(report.results().count(), TestItem::ALL.len());
    }

    #[test]
    fn test_item_keys_round_trip_through_from_str() {
        for item in TestItem::ALL {
            assert_eq!(item.key().parse::<TestItem>().unwrap(), item);
            assert_eq!(serde_json::to_value(item).unwrap(), json!(item.key()));
        }
        assert!("bogus".parse::<TestItem>().is_err());
    }

    #[test]
    fn test_case_sections_use_titles_as_keys() {
        let mut case = InternalTestingCase::new("Homepage Responsiveness Test");
        case.sections.insert(
            CaseSection::LogoutLogin,
            SectionRecord {
                status: TestStatus::Pass,
                ..SectionRecord::default()
            },
        );

        let value = serde_json::to_value(&case).unwrap();
        let section = &value["sections"]["Logout/Login scenario"];
        assert_eq!(section["status"], "pass");
        assert_eq!(section["imageUrl"], serde_json::Value::Null);
        assert_eq!(section["textFeedback"], "");
    }
}
