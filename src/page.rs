pub const INDEX_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Smart Image Analyzer</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #e9f5fe 0%, #e1f7e7 100%);
            min-height: 100vh;
            padding: 30px 20px;
            overflow-x: hidden;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.15);
            max-width: 1200px;
            margin: 0 auto;
            padding: 40px;
        }

        h1 {
            color: #0a9396;
            text-align: center;
            margin-bottom: 10px;
            font-size: 2.2em;
        }

        .subtitle {
            color: #555;
            text-align: center;
            margin-bottom: 30px;
            font-size: 1em;
        }

        .controls {
            display: flex;
            gap: 20px;
            align-items: stretch;
            flex-wrap: wrap;
        }

        .upload-area {
            flex: 2;
            min-width: 280px;
            border: 3px dashed #0a9396;
            border-radius: 15px;
            padding: 30px 20px;
            text-align: center;
            cursor: pointer;
            transition: all 0.3s;
            background: #f4fbfb;
        }

        .upload-area:hover,
        .upload-area.dragover {
            border-color: #005f73;
            background: #e6f4f4;
        }

        .upload-icon {
            font-size: 2.5em;
            margin-bottom: 10px;
        }

        .upload-text {
            color: #0a9396;
            font-size: 1.1em;
            font-weight: 600;
        }

        .upload-hint {
            color: #999;
            font-size: 0.85em;
            margin-top: 6px;
        }

        input[type="file"] {
            display: none;
        }

        .picker {
            flex: 1;
            min-width: 220px;
            display: flex;
            flex-direction: column;
            gap: 12px;
            justify-content: center;
        }

        select, button {
            font-size: 1em;
            padding: 12px;
            border-radius: 10px;
            border: 2px solid #0a9396;
        }

        button {
            background: #0a9396;
            color: white;
            font-weight: 600;
            cursor: pointer;
        }

        button:disabled {
            background: #9bc9ca;
            border-color: #9bc9ca;
            cursor: not-allowed;
        }

        .columns {
            display: none;
            gap: 30px;
            margin-top: 30px;
            padding-top: 30px;
            border-top: 2px solid #f0f0f0;
        }

        .column {
            flex: 1;
            min-width: 0;
        }

        .column h2 {
            color: #333;
            font-size: 1.3em;
            margin-bottom: 15px;
        }

        .info {
            background: #eaf4fe;
            color: #1c4e80;
            padding: 10px 14px;
            border-radius: 8px;
            margin-bottom: 8px;
        }

        .warning {
            background: #fff6e0;
            color: #8a6100;
            padding: 10px 14px;
            border-radius: 8px;
        }

        .option {
            display: flex;
            gap: 10px;
            align-items: center;
            padding: 6px 0;
        }

        pre {
            background: #f6f8fa;
            padding: 12px;
            border-radius: 8px;
            white-space: pre-wrap;
            margin-top: 15px;
        }

        .annotated {
            max-width: 100%;
            border-radius: 10px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.1);
        }

        .caption {
            color: #777;
            text-align: center;
            font-size: 0.9em;
            margin: 8px 0 15px;
        }

        .legend div {
            padding: 4px 0;
        }

        .legend b {
            margin-right: 6px;
        }

        .loading {
            text-align: center;
            padding: 30px;
            display: none;
        }

        .spinner {
            border: 4px solid #f3f3f3;
            border-top: 4px solid #0a9396;
            border-radius: 50%;
            width: 50px;
            height: 50px;
            animation: spin 1s linear infinite;
            margin: 0 auto 15px;
        }

        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }

        .success {
            background: #e3f8e8;
            color: #1b6b35;
            padding: 12px;
            border-radius: 10px;
            margin-top: 25px;
            display: none;
        }

        .error {
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            padding: 15px;
            border-radius: 10px;
            margin-top: 20px;
            display: none;
        }

        .balloon {
            position: fixed;
            bottom: -80px;
            font-size: 3em;
            pointer-events: none;
            animation: rise 3.5s ease-in forwards;
        }

        @keyframes rise {
            0% { transform: translateY(0); opacity: 1; }
            100% { transform: translateY(-120vh); opacity: 0.7; }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Smart Image Analyzer</h1>
        <p class="subtitle">Upload an image, pick an analysis, click Analyze. Select detections to highlight them.</p>

        <div class="controls">
            <div class="upload-area" id="uploadArea">
                <div class="upload-icon">📤</div>
                <div class="upload-text" id="uploadText">Click or drag an image here</div>
                <div class="upload-hint">JPG or PNG • Max 10MB</div>
                <input type="file" id="fileInput" accept="image/jpeg,image/png">
            </div>
            <div class="picker">
                <select id="analysisType">
                    <option value="classification">Image Classification</option>
                    <option value="object_detection">Object Detection</option>
                    <option value="text_extraction">Text Extraction</option>
                    <option value="face_detection">Face Detection</option>
                </select>
                <button id="analyzeButton" disabled>🚀 Analyze</button>
            </div>
        </div>

        <div class="loading" id="loading">
            <div class="spinner"></div>
            <p>Analyzing image...</p>
        </div>

        <div class="error" id="error"></div>

        <div class="columns" id="columns">
            <div class="column">
                <h2>🎯 Results</h2>
                <div id="results"></div>
            </div>
            <div class="column">
                <h2>🖼️ Annotated Image</h2>
                <img id="annotatedImage" class="annotated" alt="Annotated image">
                <div class="caption" id="caption"></div>
                <div class="legend" id="legend"></div>
            </div>
        </div>

        <div class="success" id="success">✅ Analysis Complete!</div>
    </div>

    <script>
        const uploadArea = document.getElementById('uploadArea');
        const uploadText = document.getElementById('uploadText');
        const fileInput = document.getElementById('fileInput');
        const analysisType = document.getElementById('analysisType');
        const analyzeButton = document.getElementById('analyzeButton');
        const loading = document.getElementById('loading');
        const errorDiv = document.getElementById('error');
        const columns = document.getElementById('columns');
        const results = document.getElementById('results');
        const annotatedImage = document.getElementById('annotatedImage');
        const caption = document.getElementById('caption');
        const legend = document.getElementById('legend');
        const success = document.getElementById('success');

        let currentFile = null;
        let selection = [];
        let analyzed = false;

        const nouns = {
            object_detection: 'object(s)',
            text_extraction: 'word(s)',
            face_detection: 'face(s)',
        };

        uploadArea.addEventListener('click', () => fileInput.click());

        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });

        uploadArea.addEventListener('dragleave', () => {
            uploadArea.classList.remove('dragover');
        });

        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            const file = e.dataTransfer.files[0];
            if (file && file.type.startsWith('image/')) {
                chooseFile(file);
            }
        });

        fileInput.addEventListener('change', (e) => {
            const file = e.target.files[0];
            if (file) {
                chooseFile(file);
            }
        });

        analysisType.addEventListener('change', resetResults);

        analyzeButton.addEventListener('click', () => {
            selection = [];
            send();
        });

        function chooseFile(file) {
            currentFile = file;
            uploadText.textContent = file.name;
            analyzeButton.disabled = false;
            resetResults();
        }

        function resetResults() {
            selection = [];
            analyzed = false;
            columns.style.display = 'none';
            success.style.display = 'none';
            errorDiv.style.display = 'none';
        }

        async function send() {
            if (!currentFile) {
                return;
            }

            const formData = new FormData();
            formData.append('image', currentFile, currentFile.name);
            formData.append('analysis_type', analysisType.value);
            formData.append('selection', selection.join(','));

            if (!analyzed) {
                loading.style.display = 'block';
            }
            errorDiv.style.display = 'none';

            try {
                const response = await fetch('/analyze', {
                    method: 'POST',
                    body: formData
                });
                const result = await response.json();

                if (!response.ok) {
                    throw new Error(result.error || 'Analysis failed');
                }

                analyzed = true;
                show(result);
                if (result.celebrate) {
                    balloons();
                }
            } catch (error) {
                errorDiv.textContent = 'Error: ' + error.message;
                errorDiv.style.display = 'block';
            } finally {
                loading.style.display = 'none';
            }
        }

        function show(result) {
            results.innerHTML = '';

            if (result.analysis_type === 'classification') {
                if (result.summary.length) {
                    appendText(results, 'p', 'Top Predicted Labels:').style.fontWeight = '600';
                    result.summary.forEach((line) => appendText(results, 'div', line).className = 'info');
                } else {
                    appendText(results, 'div', 'No classification results returned.').className = 'warning';
                }
            } else if (result.options.length) {
                const noun = nouns[result.analysis_type];
                appendText(results, 'p', 'Select ' + noun + ' to highlight').style.fontWeight = '600';
                result.options.forEach((text, index) => {
                    const row = document.createElement('label');
                    row.className = 'option';
                    const box = document.createElement('input');
                    box.type = 'checkbox';
                    box.checked = selection.includes(index);
                    box.addEventListener('change', () => toggle(index, box.checked));
                    row.appendChild(box);
                    appendText(row, 'span', text);
                    results.appendChild(row);
                });
            } else {
                const empty = {
                    object_detection: 'No objects detected.',
                    text_extraction: 'No text detected.',
                    face_detection: 'No faces detected.',
                };
                appendText(results, 'div', empty[result.analysis_type]).className = 'warning';
            }

            if (result.full_text) {
                appendText(results, 'p', 'Full Extracted Text:').style.cssText = 'font-weight:600;margin-top:15px';
                appendText(results, 'pre', result.full_text);
            }

            annotatedImage.src = result.annotated_image;
            caption.textContent = result.caption;

            legend.innerHTML = '';
            if (result.labels.length) {
                appendText(legend, 'p', 'Selected ' + nouns[result.analysis_type] + ':').style.fontWeight = '600';
                result.labels.forEach((label) => {
                    const line = appendText(legend, 'div', label.text);
                    line.style.color = label.color;
                });
            }

            columns.style.display = 'flex';
            success.style.display = 'block';
        }

        function toggle(index, checked) {
            if (checked) {
                selection.push(index);
            } else {
                selection = selection.filter((i) => i !== index);
            }
            send();
        }

        function appendText(parent, tag, text) {
            const node = document.createElement(tag);
            node.textContent = text;
            parent.appendChild(node);
            return node;
        }

        function balloons() {
            const colors = ['🎈', '🎈', '🎉', '🎈'];
            for (let i = 0; i < 24; i++) {
                const balloon = document.createElement('div');
                balloon.className = 'balloon';
                balloon.textContent = colors[i % colors.length];
                balloon.style.left = Math.random() * 95 + 'vw';
                balloon.style.animationDelay = Math.random() * 1.2 + 's';
                document.body.appendChild(balloon);
                setTimeout(() => balloon.remove(), 5000);
            }
        }
    </script>
</body>
</html>
"#;
